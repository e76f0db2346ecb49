use bugdesk::cli::commands;
use bugdesk::cli::{Cli, Commands};
use bugdesk::config;
use bugdesk::logging::init_logging;
use bugdesk::{StructuredError, TrackerError};
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, None) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);

    let result = match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, None),
        Commands::User { command } => commands::user::execute(command, cli.json, &overrides),
        Commands::Project { command } => commands::project::execute(command, cli.json, &overrides),
        Commands::Issue { command } => commands::issue::execute(command, cli.json, &overrides),
        Commands::Comment { command } => commands::comment::execute(command, cli.json, &overrides),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json, &overrides);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &TrackerError, json_mode: bool, overrides: &config::CliOverrides) -> ! {
    let structured = match err {
        TrackerError::UserNotFound { user } => {
            StructuredError::user_not_found(user, &known_usernames(overrides))
        }
        _ => StructuredError::from_error(err),
    };
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

/// Usernames for "did you mean" hints; empty if the workspace can't be read.
fn known_usernames(overrides: &config::CliOverrides) -> Vec<String> {
    config::open_tracker(overrides)
        .and_then(|(tracker, _)| tracker.list_users())
        .map(|users| users.into_iter().map(|user| user.username).collect())
        .unwrap_or_default()
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        actor: cli.actor.clone(),
        lock_timeout: cli.lock_timeout,
    }
}
