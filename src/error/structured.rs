//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

#![allow(clippy::option_if_let_else)]

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Database Errors (exit code 2) ===
    /// Database operation failed
    DatabaseError,
    /// Workspace not initialized
    NotInitialized,
    /// Already initialized
    AlreadyInitialized,

    // === Lookup Errors (exit code 3) ===
    /// Project with specified ID not found
    ProjectNotFound,
    /// Issue with specified ID not found
    IssueNotFound,
    /// User not found
    UserNotFound,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,
    /// Uniqueness rule violated
    Conflict,

    // === Authorization Errors (exit code 5) ===
    /// Acting user lacks permission
    Forbidden,
    /// Project still owns issues
    ProjectHasIssues,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::IssueNotFound => "ISSUE_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::ProjectHasIssues => "PROJECT_HAS_ISSUES",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Retryable means the caller might succeed after fixing its input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ValidationFailed | Self::Conflict)
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Database errors
    /// - 3: Lookup errors
    /// - 4: Validation and uniqueness errors
    /// - 5: Authorization errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseError | Self::NotInitialized | Self::AlreadyInitialized => 2,
            Self::ProjectNotFound | Self::IssueNotFound | Self::UserNotFound => 3,
            Self::ValidationFailed | Self::Conflict => 4,
            Self::Forbidden | Self::ProjectHasIssues => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `TrackerError`.
    #[must_use]
    pub fn from_error(err: &TrackerError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.user_message(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Create a structured error with similar username suggestions.
    #[must_use]
    pub fn user_not_found(searched: &str, existing_usernames: &[String]) -> Self {
        let similar = find_similar_names(searched, existing_usernames, 3);

        let hint = if similar.is_empty() {
            Some("Run 'bugdesk user list' to see registered users.".to_string())
        } else if similar.len() == 1 {
            Some(format!("Did you mean '{}'?", similar[0]))
        } else {
            Some(format!("Did you mean one of: {}?", similar.join(", ")))
        };

        Self {
            code: ErrorCode::UserNotFound,
            message: format!("User not found: {searched}"),
            hint,
            retryable: false,
            context: Some(json!({
                "searched": searched,
                "similar_usernames": similar,
            })),
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &TrackerError) -> (ErrorCode, Option<Value>) {
        match err {
            TrackerError::Database(_) => (ErrorCode::DatabaseError, None),
            TrackerError::NotInitialized => (ErrorCode::NotInitialized, None),
            TrackerError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            TrackerError::Conflict { .. } => (ErrorCode::Conflict, None),
            TrackerError::ProjectNotFound { id } => {
                (ErrorCode::ProjectNotFound, Some(json!({"project_id": id})))
            }
            TrackerError::IssueNotFound { id } => {
                (ErrorCode::IssueNotFound, Some(json!({"issue_id": id})))
            }
            TrackerError::UserNotFound { user } => {
                (ErrorCode::UserNotFound, Some(json!({"user": user})))
            }
            TrackerError::Forbidden { .. } => (ErrorCode::Forbidden, None),
            TrackerError::ProjectHasIssues { id, count } => (
                ErrorCode::ProjectHasIssues,
                Some(json!({"project_id": id, "issue_count": count})),
            ),
            TrackerError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            TrackerError::ValidationErrors { errors } => {
                let details: Vec<Value> = errors
                    .iter()
                    .map(|e| json!({"field": e.field, "message": e.message}))
                    .collect();
                (
                    ErrorCode::ValidationFailed,
                    Some(json!({"errors": details})),
                )
            }
            TrackerError::Config(_) => (ErrorCode::ConfigError, None),
            TrackerError::Io(_) => (ErrorCode::IoError, None),
            TrackerError::Json(_) => (ErrorCode::JsonError, None),
            TrackerError::Yaml(_) => (ErrorCode::YamlError, None),
            TrackerError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &TrackerError) -> Option<String> {
        if let Some(suggestion) = err.suggestion() {
            return Some(suggestion.to_string());
        }

        match err {
            TrackerError::ProjectNotFound { .. } => {
                Some("Run 'bugdesk project list' to see available projects.".to_string())
            }
            TrackerError::IssueNotFound { .. } => {
                Some("Run 'bugdesk issue list <project>' to see available issues.".to_string())
            }
            TrackerError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                Some("Another process holds the database lock; retry or raise --lock-timeout.".to_string())
            }
            _ => None,
        }
    }
}

/// Levenshtein edit distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }
    for (j, item) in matrix[0].iter_mut().enumerate().take(b_len + 1) {
        *item = j;
    }

    for (i, a_char) in a_chars.iter().enumerate() {
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[a_len][b_len]
}

/// Find names close to `target`, closest first.
#[must_use]
pub fn find_similar_names(target: &str, existing: &[String], max_suggestions: usize) -> Vec<String> {
    let target_lower = target.to_lowercase();
    let max_distance = (target.chars().count() / 2).max(2);

    let mut scored: Vec<(usize, &String)> = existing
        .iter()
        .map(|name| (levenshtein_distance(&target_lower, &name.to_lowercase()), name))
        .filter(|(dist, _)| *dist <= max_distance)
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(_, name)| name.clone())
        .collect()
}
