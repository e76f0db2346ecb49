//! Issue commands: create, list, show, edit, delete.

use crate::changes::UNASSIGNED;
use crate::cli::commands::{print_json, require_identity};
use crate::cli::{IssueCommands, IssueCreateArgs, IssueEditArgs, IssueListArgs};
use crate::config::{self, CliOverrides, Settings};
use crate::error::Result;
use crate::model::{EntityId, Issue};
use crate::service::{IssueDetail, Tracker};
use crate::storage::IssueFilters;
use crate::util::format_date;
use crate::validation::{EditIssueForm, NewIssueForm};
use serde_json::json;
use std::collections::HashMap;

/// Execute an `issue` subcommand.
///
/// # Errors
///
/// Returns an error if the workspace cannot be opened or the operation fails.
pub fn execute(command: &IssueCommands, json: bool, cli: &CliOverrides) -> Result<()> {
    let (mut tracker, settings) = config::open_tracker(cli)?;

    match command {
        IssueCommands::Create(args) => create(&mut tracker, &settings, args, json),
        IssueCommands::List(args) => list(&tracker, args, json),
        IssueCommands::Show { id } => show(&tracker, *id, json),
        IssueCommands::Edit(args) => edit(&mut tracker, &settings, args, json),
        IssueCommands::Delete { id } => {
            let identity = require_identity(&tracker, &settings)?;
            tracker.delete_issue(identity, *id)?;
            if json {
                return print_json(&json!({ "deleted_issue": id }));
            }
            println!("Deleted issue {id}");
            Ok(())
        }
    }
}

fn create(
    tracker: &mut Tracker,
    settings: &Settings,
    args: &IssueCreateArgs,
    json: bool,
) -> Result<()> {
    let identity = require_identity(tracker, settings)?;
    let form = NewIssueForm {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority.clone(),
        due_date: args.due.clone(),
    };
    let outcome = tracker.create_issue(identity, args.project_id, &form)?;

    if json {
        return print_json(&outcome);
    }
    println!("Created issue {}: {}", outcome.issue.id, outcome.issue.title);
    Ok(())
}

fn list(tracker: &Tracker, args: &IssueListArgs, json: bool) -> Result<()> {
    let filters = IssueFilters::from_raw(
        args.project_id,
        args.status.as_deref(),
        args.priority.as_deref(),
        args.assignee.as_deref(),
        args.search.as_deref(),
        args.page,
    );
    let listing = tracker.list_issues(&filters)?;

    if json {
        return print_json(&listing.page);
    }

    let page = &listing.page;
    if page.items.is_empty() {
        println!("No issues found in {}.", listing.project.name);
        return Ok(());
    }

    let names: HashMap<EntityId, String> = listing
        .users
        .iter()
        .map(|user| (user.id, user.username.clone()))
        .collect();

    for issue in &page.items {
        let assignee = issue
            .assignee_id
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| UNASSIGNED.to_string());
        println!(
            "{:>4}  [{:<11}] [{:<8}] {}  ({assignee})",
            issue.id, issue.status, issue.priority, issue.title
        );
    }
    println!(
        "Page {} of {} ({} issue(s))",
        page.page,
        page.pages.max(1),
        page.total
    );
    if page.has_next {
        println!("Next: --page {}", page.page + 1);
    }
    Ok(())
}

fn show(tracker: &Tracker, id: EntityId, json: bool) -> Result<()> {
    let detail = tracker.issue_detail(id)?;

    if json {
        return print_json(&detail);
    }

    let mut ids = vec![detail.issue.reporter_id];
    ids.extend(detail.issue.assignee_id);
    ids.extend(detail.comments.iter().map(|c| c.user_id));
    ids.extend(detail.activities.iter().map(|a| a.user_id));
    let names = tracker.storage().user_display_names(&ids)?;

    print_issue(&detail, &names);
    Ok(())
}

fn print_issue(detail: &IssueDetail, names: &HashMap<EntityId, String>) {
    let name = |id: EntityId| names.get(&id).map_or("?", String::as_str);
    let issue = &detail.issue;

    println!("#{} {}", issue.id, issue.title);
    println!("Project:  {}", detail.project.name);
    println!("Status:   {}", issue.status);
    println!("Priority: {}", issue.priority);
    println!("Reporter: {}", name(issue.reporter_id));
    println!(
        "Assignee: {}",
        issue.assignee_id.map_or(UNASSIGNED, name)
    );
    if let Some(due) = issue.due_date {
        println!("Due:      {}", format_date(due));
    }
    println!("Created:  {}", issue.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated:  {}", issue.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{description}");
    }

    if !detail.comments.is_empty() {
        println!();
        println!("Comments:");
        for comment in &detail.comments {
            println!(
                "[{}] at {}",
                name(comment.user_id),
                comment.created_at.format("%Y-%m-%d %H:%M")
            );
            println!("{}", comment.content.trim_end_matches('\n'));
        }
    }

    println!();
    println!("Activity:");
    for activity in &detail.activities {
        println!(
            "{}  {:<10} {:<12} {}",
            activity.created_at.format("%Y-%m-%d %H:%M"),
            name(activity.user_id),
            activity.action,
            activity.detail.as_deref().unwrap_or("")
        );
    }
}

/// Prefill the edit form from the issue, then apply the given flags.
fn edit_form(current: &Issue, args: &IssueEditArgs) -> EditIssueForm {
    let mut form = EditIssueForm::from_issue(current);
    if let Some(title) = &args.title {
        form.title.clone_from(title);
    }
    if args.description.is_some() {
        form.description.clone_from(&args.description);
    }
    if args.priority.is_some() {
        form.priority.clone_from(&args.priority);
    }
    if args.status.is_some() {
        form.status.clone_from(&args.status);
    }
    if args.assignee.is_some() {
        form.assignee_id.clone_from(&args.assignee);
    }
    if args.due.is_some() {
        form.due_date.clone_from(&args.due);
    }
    form
}

fn edit(
    tracker: &mut Tracker,
    settings: &Settings,
    args: &IssueEditArgs,
    json: bool,
) -> Result<()> {
    let identity = require_identity(tracker, settings)?;
    let current = tracker.issue(args.id)?;
    let form = edit_form(&current, args);
    let outcome = tracker.edit_issue(identity, args.id, &form)?;

    if json {
        return print_json(&outcome);
    }
    println!("Updated issue {}: {}", outcome.issue.id, outcome.detail);
    Ok(())
}
