//! Project and membership commands.

use crate::cli::commands::{print_json, require_identity, user_id_by_name};
use crate::cli::{MemberAddArgs, MemberRemoveArgs, ProjectCommands, ProjectCreateArgs};
use crate::config::{self, CliOverrides, Settings};
use crate::error::Result;
use crate::model::EntityId;
use crate::service::Tracker;
use crate::util::snippet;
use crate::validation::ProjectForm;
use serde_json::json;

/// Execute a `project` subcommand.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the operation fails.
pub fn execute(command: &ProjectCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut tracker, settings) = config::open_tracker(cli)?;

    match command {
        ProjectCommands::Create(args) => create(&mut tracker, &settings, args, json),
        ProjectCommands::List => list(&tracker, json),
        ProjectCommands::Delete(args) => {
            let identity = require_identity(&tracker, &settings)?;
            let removed = tracker.delete_project(identity, args.project_id, args.cascade)?;
            if json {
                return print_json(&json!({
                    "deleted_project": args.project_id,
                    "deleted_issues": removed,
                }));
            }
            println!("Deleted project {} ({removed} issue(s))", args.project_id);
            Ok(())
        }
        ProjectCommands::Members { project_id } => members(&tracker, *project_id, json),
        ProjectCommands::AddMember(args) => add_member(&mut tracker, &settings, args, json),
        ProjectCommands::RemoveMember(args) => remove_member(&mut tracker, &settings, args, json),
    }
}

fn create(
    tracker: &mut Tracker,
    settings: &Settings,
    args: &ProjectCreateArgs,
    json: bool,
) -> Result<()> {
    let identity = require_identity(tracker, settings)?;
    let form = ProjectForm {
        name: args.name.clone(),
        description: args.description.clone(),
    };
    let project = tracker.create_project(identity, &form)?;

    if json {
        return print_json(&project);
    }
    println!("Created project {} (id {})", project.name, project.id);
    Ok(())
}

fn list(tracker: &Tracker, json: bool) -> Result<()> {
    let projects = tracker.list_projects()?;

    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }
    for project in projects {
        let description = project.description.as_deref().unwrap_or("");
        println!(
            "{:>4}  {:<24} {}",
            project.id,
            project.name,
            snippet(description, 60)
        );
    }
    Ok(())
}

fn members(tracker: &Tracker, project_id: EntityId, json: bool) -> Result<()> {
    let members = tracker.list_members(project_id)?;

    if json {
        return print_json(&members);
    }
    if members.is_empty() {
        println!("Project {project_id} has no members.");
        return Ok(());
    }
    for view in members {
        println!("{:>4}  {:<20} {}", view.member.user_id, view.username, view.member.role);
    }
    Ok(())
}

fn add_member(
    tracker: &mut Tracker,
    settings: &Settings,
    args: &MemberAddArgs,
    json: bool,
) -> Result<()> {
    let identity = require_identity(tracker, settings)?;
    let user_id = user_id_by_name(tracker, &args.username)?;
    let member = tracker.add_member(identity, args.project_id, user_id, args.role.as_deref())?;

    if json {
        return print_json(&member);
    }
    println!(
        "Added {} to project {} as {}",
        args.username, args.project_id, member.role
    );
    Ok(())
}

fn remove_member(
    tracker: &mut Tracker,
    settings: &Settings,
    args: &MemberRemoveArgs,
    json: bool,
) -> Result<()> {
    let identity = require_identity(tracker, settings)?;
    let user_id = user_id_by_name(tracker, &args.username)?;
    let removed = tracker.remove_member(identity, args.project_id, user_id)?;

    if json {
        return print_json(&json!({ "removed": removed }));
    }
    if removed {
        println!("Removed {} from project {}", args.username, args.project_id);
    } else {
        println!("{} is not a member of project {}", args.username, args.project_id);
    }
    Ok(())
}
