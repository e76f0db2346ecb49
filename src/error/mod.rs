//! Error types and handling for `bugdesk`.
//!
//! Every failure a request can hit falls into one of four user-facing kinds
//! (validation, uniqueness conflict, not found, forbidden) or is an internal
//! storage/I/O problem. The user-facing kinds carry the exact message the
//! caller should show.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for wrapped errors
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for scripted callers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `bugdesk` operations.
#[derive(Error, Debug)]
pub enum TrackerError {
    // === Storage Errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A write violated a uniqueness rule.
    #[error("{message}")]
    Conflict { message: String },

    // === Lookup Errors ===
    /// Project with the specified ID was not found.
    #[error("Project not found: {id}")]
    ProjectNotFound { id: i64 },

    /// Issue with the specified ID was not found.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: i64 },

    /// User could not be resolved by id or name.
    #[error("User not found: {user}")]
    UserNotFound { user: String },

    // === Authorization Errors ===
    /// The acting user may not perform this operation.
    #[error("{message}")]
    Forbidden { message: String },

    /// Deleting a project that still owns issues without asking for a cascade.
    #[error("Cannot delete project {id}: it still has {count} issue(s)")]
    ProjectHasIssues { id: i64, count: usize },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("{reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workspace not initialized.
    #[error("bugdesk not initialized: run 'bugdesk init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The user-facing reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl TrackerError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized
                | Self::Conflict { .. }
                | Self::ProjectNotFound { .. }
                | Self::IssueNotFound { .. }
                | Self::UserNotFound { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::ProjectHasIssues { .. }
        )
    }

    /// Is this a "not found" outcome for a referenced entity?
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. } | Self::IssueNotFound { .. } | Self::UserNotFound { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: bugdesk init"),
            Self::ProjectHasIssues { .. } => Some("Use --cascade to delete its issues as well"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::Forbidden { .. } => {
                Some("Only the reporter, the project owner or the assignee may edit an issue")
            }
            _ => None,
        }
    }

    /// The message a form handler should flash back to the user.
    ///
    /// For validation failures this is the first field message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationErrors { errors } => errors
                .first()
                .map_or_else(|| self.to_string(), |err| err.message.clone()),
            _ => self.to_string(),
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a uniqueness conflict with the message to show the user.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an authorization denial.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `TrackerError`.
pub type Result<T> = std::result::Result<T, TrackerError>;
