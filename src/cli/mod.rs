//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Project issue tracker (`SQLite`)
#[derive(Parser, Debug)]
#[command(name = "bugdesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to .bugdesk/bugdesk.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Username to act as
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a bugdesk workspace
    Init {
        /// Overwrite existing DB
        #[arg(long)]
        force: bool,
    },

    /// Manage accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage projects and their members
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage issues
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Manage comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account
    Register(RegisterArgs),
    /// Check credentials and report the matching account
    Login(LoginArgs),
    /// List all accounts
    List,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Password confirmation
    #[arg(long)]
    pub confirm: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,

    /// Store the account as the workspace actor in config.yaml
    #[arg(long)]
    pub save: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project owned by the actor
    Create(ProjectCreateArgs),
    /// List projects, newest first
    List,
    /// Delete a project (owner only)
    Delete(ProjectDeleteArgs),
    /// List project members
    Members {
        /// Project ID
        project_id: i64,
    },
    /// Add a member (owner only)
    AddMember(MemberAddArgs),
    /// Remove a member (owner only)
    RemoveMember(MemberRemoveArgs),
}

#[derive(Args, Debug)]
pub struct ProjectCreateArgs {
    /// Project name (unique)
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProjectDeleteArgs {
    /// Project ID
    pub project_id: i64,

    /// Also delete the project's issues, comments and activity
    #[arg(long)]
    pub cascade: bool,
}

#[derive(Args, Debug)]
pub struct MemberAddArgs {
    /// Project ID
    pub project_id: i64,

    /// Username of the member to add
    pub username: String,

    /// Member role
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Args, Debug)]
pub struct MemberRemoveArgs {
    /// Project ID
    pub project_id: i64,

    /// Username of the member to remove
    pub username: String,
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// File a new issue in a project
    Create(IssueCreateArgs),
    /// List a project's issues with filters
    List(IssueListArgs),
    /// Show an issue with its comments and activity
    Show {
        /// Issue ID
        id: i64,
    },
    /// Edit an issue (reporter, project owner or assignee)
    Edit(IssueEditArgs),
    /// Delete an issue (reporter or project owner)
    Delete {
        /// Issue ID
        id: i64,
    },
}

#[derive(Args, Debug)]
pub struct IssueCreateArgs {
    /// Project ID
    pub project_id: i64,

    /// Issue title
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Priority (Low, Medium, High, Critical)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct IssueListArgs {
    /// Project ID
    pub project_id: i64,

    /// Filter by exact status
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by exact priority
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Filter by assignee ID, or "unassigned"
    #[arg(long)]
    pub assignee: Option<String>,

    /// Title substring (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Page number (20 issues per page)
    #[arg(long)]
    pub page: Option<i64>,
}

/// Fields not given keep their current value. An empty value goes through the
/// edit form's blank handling.
#[derive(Args, Debug, Default)]
pub struct IssueEditArgs {
    /// Issue ID
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Assignee user ID (empty to unassign)
    #[arg(long)]
    pub assignee: Option<String>,

    /// Due date YYYY-MM-DD (empty to clear)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommands {
    /// Add a comment to an issue
    Add(CommentAddArgs),
}

#[derive(Args, Debug)]
pub struct CommentAddArgs {
    /// Issue ID
    pub issue_id: i64,

    /// Comment text
    pub text: Vec<String>,

    /// Comment text (alternative flag)
    #[arg(long = "message", short = 'm')]
    pub message: Option<String>,
}
