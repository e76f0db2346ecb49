//! Core data types for `bugdesk`.
//!
//! This module defines the entities persisted by the tracker:
//! - `User` - Account that owns projects and authors issues/comments
//! - `Project` - Named container of issues and members
//! - `Issue` - The core work item
//! - `Comment` - Free-text discussion on an issue
//! - `Activity` - Append-only audit log entry for an issue
//! - `ProjectMember` - Role of a user inside a project

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier type shared by all tables.
pub type EntityId = i64;

/// Issue workflow status.
///
/// The four named states are the ones offered to users; any other non-empty
/// value is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
    Custom(String),
}

impl Status {
    /// The options presented in status pickers, in display order.
    pub const KNOWN: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Status {
    /// Map a stored value back to a status.
    ///
    /// Only an exact match of a known display string becomes a named state;
    /// anything else is kept verbatim.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Custom(s.to_string()))
    }
}

impl FromStr for Status {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(crate::error::TrackerError::validation(
                "status",
                "Status cannot be empty.",
            ));
        }
        Ok(Self::from_stored(s))
    }
}

/// Issue priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    Custom(String),
}

impl Priority {
    /// The options presented in priority pickers, in display order.
    pub const KNOWN: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Priority {
    /// Map a stored value back to a priority, keeping unknown values verbatim.
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Custom(s.to_string()))
    }
}

impl FromStr for Priority {
    type Err = crate::error::TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(crate::error::TrackerError::validation(
                "priority",
                "Priority cannot be empty.",
            ));
        }
        Ok(Self::from_stored(s))
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(Status);
string_serde!(Priority);

/// Audit activity tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityAction {
    Created,
    Commented,
    Updated,
    Custom(String),
}

impl ActivityAction {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "Created",
            Self::Commented => "Commented",
            Self::Updated => "Updated",
            Self::Custom(value) => value,
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Created" => Self::Created,
            "Commented" => Self::Commented,
            "Updated" => Self::Updated,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ActivityAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    /// Opaque credential; never serialized.
    #[serde(skip)]
    pub password_hash: String,
}

/// A named container of issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub owner_id: EntityId,
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub id: EntityId,

    /// Title (required, non-empty).
    pub title: String,

    /// Detailed description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Workflow status.
    #[serde(default)]
    pub status: Status,

    /// Priority.
    #[serde(default)]
    pub priority: Priority,

    /// Owning project.
    pub project_id: EntityId,

    /// User who filed the issue; never changes.
    pub reporter_id: EntityId,

    /// User currently responsible for the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<EntityId>,

    /// Creation timestamp.
    pub created_at: DateTime<FixedOffset>,

    /// Last update timestamp.
    pub updated_at: DateTime<FixedOffset>,

    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Issue {
    /// May `user_id` edit this issue inside `project`?
    ///
    /// Allowed for the reporter, the project owner, or the current assignee.
    #[must_use]
    pub fn can_be_edited_by(&self, user_id: EntityId, project: &Project) -> bool {
        let is_reporter = self.reporter_id == user_id;
        let is_owner = project.owner_id == user_id;
        let is_assignee = self.assignee_id == Some(user_id);
        is_reporter || is_owner || is_assignee
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: EntityId,
    pub issue_id: EntityId,
    pub user_id: EntityId,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

/// An entry in an issue's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub id: EntityId,
    pub issue_id: EntityId,
    pub user_id: EntityId,
    pub action: ActivityAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

/// Default role assigned to new project members.
pub const DEFAULT_MEMBER_ROLE: &str = "member";

/// Association of a user to a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMember {
    pub id: EntityId,
    pub project_id: EntityId,
    pub user_id: EntityId,
    pub role: String,
}
