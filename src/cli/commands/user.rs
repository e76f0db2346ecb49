//! Account commands: register, login, list.

use crate::cli::{LoginArgs, RegisterArgs, UserCommands};
use crate::cli::commands::print_json;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::service::Tracker;
use crate::validation::{LoginForm, RegistrationForm};
use std::path::Path;

/// Execute a `user` subcommand.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the operation fails.
pub fn execute(command: &UserCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let workspace_dir = config::discover_workspace_dir(None)?;
    let (storage, _settings) = config::open_storage(&workspace_dir, cli)?;
    let mut tracker = Tracker::new(storage);

    match command {
        UserCommands::Register(args) => register(&mut tracker, args, json),
        UserCommands::Login(args) => login(&tracker, &workspace_dir, args, json),
        UserCommands::List => list(&tracker, json),
    }
}

fn register(tracker: &mut Tracker, args: &RegisterArgs, json: bool) -> Result<()> {
    let form = RegistrationForm {
        username: args.username.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        confirm: args.confirm.clone(),
    };
    let user = tracker.register(&form)?;

    if json {
        return print_json(&user);
    }
    println!("Registered {} (id {})", user.username, user.id);
    Ok(())
}

fn login(tracker: &Tracker, workspace_dir: &Path, args: &LoginArgs, json: bool) -> Result<()> {
    let form = LoginForm {
        email: args.email.clone(),
        password: args.password.clone(),
    };
    let identity = tracker.authenticate(&form)?;
    let user = tracker.current_user(identity)?;

    if args.save {
        config::save_actor(workspace_dir, &user.username)?;
    }

    if json {
        return print_json(&user);
    }
    println!("Logged in as {} (id {})", user.username, user.id);
    if args.save {
        println!("Saved {} as the workspace actor", user.username);
    }
    Ok(())
}

fn list(tracker: &Tracker, json: bool) -> Result<()> {
    let users = tracker.list_users()?;

    if json {
        return print_json(&users);
    }
    if users.is_empty() {
        println!("No users registered.");
        return Ok(());
    }
    for user in users {
        println!("{:>4}  {:<20} {}", user.id, user.username, user.email);
    }
    Ok(())
}
