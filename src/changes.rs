//! Issue edit change tracking.
//!
//! Compares the editable fields of an issue before and after an edit and
//! renders the audit text stored on the resulting "Updated" activity.
//!
//! Descriptors are emitted in a fixed field order (title, description,
//! priority, due date, status, assignee) and joined with `"; "`. An edit that
//! changes nothing is recorded as `"No changes made."`.

use chrono::NaiveDate;

use crate::model::{EntityId, Issue, Priority, Status};
use crate::util::format_date;

/// Audit text for an edit that left every field unchanged.
pub const NO_CHANGES: &str = "No changes made.";

/// Display name for a null assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// The user-editable fields of an issue at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub assignee_id: Option<EntityId>,
    pub due_date: Option<NaiveDate>,
}

impl From<&Issue> for IssueSnapshot {
    fn from(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            priority: issue.priority.clone(),
            status: issue.status.clone(),
            assignee_id: issue.assignee_id,
            due_date: issue.due_date,
        }
    }
}

/// Describe every field that differs between `old` and `new`.
///
/// `display_name` resolves a user id to the name shown for assignees; ids it
/// cannot resolve render as `id:<n>`.
pub fn describe_changes<F>(old: &IssueSnapshot, new: &IssueSnapshot, display_name: F) -> Vec<String>
where
    F: Fn(EntityId) -> Option<String>,
{
    let mut changes = Vec::new();

    if old.title != new.title {
        changes.push(format!("title: '{}' -> '{}'", old.title, new.title));
    }

    let old_description = old.description.as_deref().unwrap_or("");
    let new_description = new.description.as_deref().unwrap_or("");
    if old_description != new_description {
        changes.push("description: (changed)".to_string());
    }

    if old.priority != new.priority {
        changes.push(format!("priority: {} -> {}", old.priority, new.priority));
    }

    let old_due = old.due_date.map(format_date);
    let new_due = new.due_date.map(format_date);
    if old_due != new_due {
        changes.push(format!(
            "due_date: {} -> {}",
            old_due.as_deref().unwrap_or("None"),
            new_due.as_deref().unwrap_or("None")
        ));
    }

    if old.status != new.status {
        changes.push(format!("status: {} -> {}", old.status, new.status));
    }

    if old.assignee_id != new.assignee_id {
        changes.push(format!(
            "assignee: {} -> {}",
            assignee_name(old.assignee_id, &display_name),
            assignee_name(new.assignee_id, &display_name)
        ));
    }

    changes
}

/// Join descriptors into the stored audit text.
#[must_use]
pub fn summarize(changes: &[String]) -> String {
    if changes.is_empty() {
        NO_CHANGES.to_string()
    } else {
        changes.join("; ")
    }
}

/// Diff two snapshots straight into audit text.
pub fn change_detail<F>(old: &IssueSnapshot, new: &IssueSnapshot, display_name: F) -> String
where
    F: Fn(EntityId) -> Option<String>,
{
    summarize(&describe_changes(old, new, display_name))
}

fn assignee_name<F>(id: Option<EntityId>, display_name: &F) -> String
where
    F: Fn(EntityId) -> Option<String>,
{
    match id {
        None => UNASSIGNED.to_string(),
        Some(id) => display_name(id).unwrap_or_else(|| format!("id:{id}")),
    }
}
