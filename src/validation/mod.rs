//! Validation helpers for `bugdesk`.
//!
//! Forms arrive as raw text exactly as a user typed it. These routines check
//! them, apply the form defaults, and return either typed values or
//! structured validation errors carrying the message to show the user. They
//! never touch storage; checks that need the database (uniqueness, assignee
//! existence) belong to the service layer.

use chrono::NaiveDate;

use crate::changes::IssueSnapshot;
use crate::error::{Result, TrackerError, ValidationError};
use crate::model::{EntityId, Issue, Priority, Status};
use crate::util::parse_due_date;

pub const MSG_ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const MSG_PASSWORDS_DIFFER: &str = "Passwords do not match.";
pub const MSG_PROJECT_NAME_REQUIRED: &str = "Project name is required.";
pub const MSG_TITLE_REQUIRED: &str = "Title is required.";
pub const MSG_CONTENT_EMPTY: &str = "Content cannot be empty.";
pub const MSG_INVALID_ASSIGNEE: &str = "Invalid assignee ID.";

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !blank(v))
}

fn finish(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TrackerError::from_validation_errors(errors))
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl RegistrationForm {
    /// # Errors
    ///
    /// Every missing field reports "All fields are required."; only a complete
    /// form is checked for a matching confirmation.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for (field, value) in [("username", &self.username), ("email", &self.email)] {
            if blank(value) {
                errors.push(ValidationError::new(field, MSG_ALL_FIELDS_REQUIRED));
            }
        }
        for (field, value) in [("password", &self.password), ("confirm", &self.confirm)] {
            if value.is_empty() {
                errors.push(ValidationError::new(field, MSG_ALL_FIELDS_REQUIRED));
            }
        }

        if errors.is_empty() && self.password != self.confirm {
            errors.push(ValidationError::new("confirm", MSG_PASSWORDS_DIFFER));
        }

        finish(errors)
    }
}

/// Log-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// New-project form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectForm {
    /// # Errors
    ///
    /// Returns "Project name is required." for a blank name.
    pub fn validate(&self) -> Result<()> {
        if blank(&self.name) {
            return Err(TrackerError::validation("name", MSG_PROJECT_NAME_REQUIRED));
        }
        Ok(())
    }

    /// Description with blanks folded to `None`.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

/// New-issue form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssueForm {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

/// A new-issue form after validation and defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNewIssue {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewIssueForm {
    /// Validate and apply defaults: an empty priority becomes `Medium`.
    ///
    /// # Errors
    ///
    /// Returns "Title is required." or "Invalid due date format. Use
    /// YYYY-MM-DD.".
    pub fn validate(&self) -> Result<ValidNewIssue> {
        if blank(&self.title) {
            return Err(TrackerError::validation("title", MSG_TITLE_REQUIRED));
        }

        let priority = match non_blank(self.priority.as_deref()) {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };
        let due_date = parse_due_date(self.due_date.as_deref())?;

        Ok(ValidNewIssue {
            title: self.title.clone(),
            description: non_blank(self.description.as_deref()).map(str::to_string),
            priority,
            due_date,
        })
    }
}

/// Edit-issue form.
///
/// Every field is resubmitted on edit; blanks carry form defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditIssueForm {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assignee_id: Option<String>,
    pub due_date: Option<String>,
}

impl EditIssueForm {
    /// Prefill a form from the current state of an issue.
    #[must_use]
    pub fn from_issue(issue: &Issue) -> Self {
        Self {
            title: issue.title.clone(),
            description: issue.description.clone(),
            priority: Some(issue.priority.to_string()),
            status: Some(issue.status.to_string()),
            assignee_id: issue.assignee_id.map(|id| id.to_string()),
            due_date: issue.due_date.map(crate::util::format_date),
        }
    }

    /// Resolve the submitted values against the issue being edited.
    ///
    /// Blank priority becomes `Medium`, blank status keeps the current
    /// status, blank description becomes the empty string and a blank
    /// assignee unassigns the issue.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in form order: "Title is required.",
    /// "Invalid assignee ID.", "Invalid due date format. Use YYYY-MM-DD.".
    pub fn resolve(&self, current: &Issue) -> Result<IssueSnapshot> {
        if blank(&self.title) {
            return Err(TrackerError::validation("title", MSG_TITLE_REQUIRED));
        }

        let assignee_id = parse_assignee_id(self.assignee_id.as_deref())?;
        let due_date = parse_due_date(self.due_date.as_deref())?;

        let priority = match non_blank(self.priority.as_deref()) {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };
        let status: Status = match non_blank(self.status.as_deref()) {
            Some(raw) => raw.parse()?,
            None => current.status.clone(),
        };

        Ok(IssueSnapshot {
            title: self.title.clone(),
            description: Some(self.description.clone().unwrap_or_default()),
            priority,
            status,
            assignee_id,
            due_date,
        })
    }
}

/// Parse the raw assignee field of the edit form.
///
/// # Errors
///
/// Returns "Invalid assignee ID." for non-numeric text.
pub fn parse_assignee_id(raw: Option<&str>) -> Result<Option<EntityId>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<EntityId>()
            .map(Some)
            .map_err(|_| TrackerError::validation("assignee_id", MSG_INVALID_ASSIGNEE)),
    }
}

/// Comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentForm {
    pub content: String,
}

impl CommentForm {
    /// # Errors
    ///
    /// Returns "Content cannot be empty." for blank content.
    pub fn validate(&self) -> Result<()> {
        if blank(&self.content) {
            return Err(TrackerError::validation("content", MSG_CONTENT_EMPTY));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn registration() -> RegistrationForm {
        RegistrationForm {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "pw".to_string(),
            confirm: "pw".to_string(),
        }
    }

    fn issue() -> Issue {
        let at = FixedOffset::east_opt(19_800)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .unwrap();
        Issue {
            id: 7,
            title: "Crash".to_string(),
            description: None,
            status: Status::InProgress,
            priority: Priority::High,
            project_id: 1,
            reporter_id: 1,
            assignee_id: Some(2),
            created_at: at,
            updated_at: at,
            due_date: None,
        }
    }

    #[test]
    fn registration_requires_every_field() {
        assert!(registration().validate().is_ok());

        let form = RegistrationForm {
            email: String::new(),
            ..registration()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.user_message(), "All fields are required.");
    }

    #[test]
    fn registration_checks_confirmation() {
        let form = RegistrationForm {
            confirm: "other".to_string(),
            ..registration()
        };
        assert_eq!(
            form.validate().unwrap_err().user_message(),
            "Passwords do not match."
        );
    }

    #[test]
    fn project_name_required() {
        let form = ProjectForm {
            name: "  ".to_string(),
            description: Some(String::new()),
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Project name is required."
        );
        assert_eq!(form.description(), None);
    }

    #[test]
    fn new_issue_defaults_priority() {
        let form = NewIssueForm {
            title: "Crash".to_string(),
            priority: Some(String::new()),
            ..NewIssueForm::default()
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.priority, Priority::Medium);
        assert_eq!(valid.due_date, None);
    }

    #[test]
    fn new_issue_rejects_bad_date() {
        let form = NewIssueForm {
            title: "Crash".to_string(),
            due_date: Some("next week".to_string()),
            ..NewIssueForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Invalid due date format. Use YYYY-MM-DD."
        );
    }

    #[test]
    fn edit_blank_fields_apply_defaults() {
        let current = issue();
        let form = EditIssueForm {
            title: "Crash".to_string(),
            ..EditIssueForm::default()
        };
        let resolved = form.resolve(&current).unwrap();

        assert_eq!(resolved.priority, Priority::Medium);
        assert_eq!(resolved.status, Status::InProgress);
        assert_eq!(resolved.description.as_deref(), Some(""));
        assert_eq!(resolved.assignee_id, None);
    }

    #[test]
    fn edit_prefill_is_a_no_op() {
        let current = issue();
        let resolved = EditIssueForm::from_issue(&current).resolve(&current).unwrap();
        assert_eq!(
            crate::changes::change_detail(&IssueSnapshot::from(&current), &resolved, |_| None),
            "No changes made."
        );
    }

    #[test]
    fn edit_rejects_non_numeric_assignee() {
        let form = EditIssueForm {
            title: "Crash".to_string(),
            assignee_id: Some("bob".to_string()),
            ..EditIssueForm::default()
        };
        assert_eq!(
            form.resolve(&issue()).unwrap_err().to_string(),
            "Invalid assignee ID."
        );
    }

    #[test]
    fn edit_title_checked_first() {
        let form = EditIssueForm {
            title: String::new(),
            assignee_id: Some("bob".to_string()),
            due_date: Some("bad".to_string()),
            ..EditIssueForm::default()
        };
        assert_eq!(
            form.resolve(&issue()).unwrap_err().to_string(),
            "Title is required."
        );
    }

    #[test]
    fn comment_content_required() {
        let form = CommentForm {
            content: String::new(),
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Content cannot be empty."
        );
        assert!(CommentForm {
            content: "ok".to_string()
        }
        .validate()
        .is_ok());
    }
}
