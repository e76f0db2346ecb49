//! Handler-facing API.
//!
//! Every operation takes the acting user as an explicit [`Identity`] together
//! with raw form fields, validates them, performs at most one storage
//! mutation (with its activity written in the same transaction) and returns
//! the resulting entity or a [`TrackerError`] carrying the user-facing
//! message.

use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::model::{
    Activity, Comment, DEFAULT_MEMBER_ROLE, EntityId, Issue, Priority, Project, ProjectMember,
    Status, User,
};
use crate::storage::activity::created_detail;
use crate::storage::{IssueFilters, NewIssue, Page, SqliteStorage};
use crate::util::{hash_password, verify_password};
use crate::validation::{
    CommentForm, EditIssueForm, LoginForm, MSG_INVALID_ASSIGNEE, NewIssueForm, ProjectForm,
    RegistrationForm,
};

pub const MSG_DUPLICATE_USER: &str = "Username or email already exists.";
pub const MSG_DUPLICATE_PROJECT: &str = "Project with this name already exists.";
pub const MSG_BAD_CREDENTIALS: &str = "Invalid email or password.";
pub const MSG_EDIT_FORBIDDEN: &str = "You are not authorized to edit this issue.";
pub const MSG_DELETE_FORBIDDEN: &str = "You are not authorized to delete this issue.";
pub const MSG_OWNER_ONLY: &str = "Only the project owner can do this.";

/// The authenticated user a request acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: EntityId,
}

impl Identity {
    #[must_use]
    pub const fn new(user_id: EntityId) -> Self {
        Self { user_id }
    }
}

/// An issue after a create or edit, with the audit text that was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueOutcome {
    pub issue: Issue,
    pub detail: String,
}

/// A stored comment with the audit text that was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentOutcome {
    pub comment: Comment,
    pub detail: String,
}

/// Everything shown on an issue page.
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    pub issue: Issue,
    pub project: Project,
    pub comments: Vec<Comment>,
    pub activities: Vec<Activity>,
}

/// A filtered issue listing plus the option lists for the filter controls.
#[derive(Debug, Clone, Serialize)]
pub struct IssueListing {
    pub project: Project,
    pub page: Page<Issue>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
    pub users: Vec<User>,
}

/// A membership joined with the member's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub member: ProjectMember,
    pub username: String,
}

/// Status names offered by status pickers.
#[must_use]
pub fn status_options() -> Vec<String> {
    Status::KNOWN.iter().map(ToString::to_string).collect()
}

/// Priority names offered by priority pickers.
#[must_use]
pub fn priority_options() -> Vec<String> {
    Priority::KNOWN.iter().map(ToString::to_string).collect()
}

/// The tracker's request handlers over one storage connection.
#[derive(Debug)]
pub struct Tracker {
    storage: SqliteStorage,
}

impl Tracker {
    #[must_use]
    pub const fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    #[must_use]
    pub const fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Validation failures from the form, or `Conflict` with "Username or
    /// email already exists.".
    pub fn register(&mut self, form: &RegistrationForm) -> Result<User> {
        form.validate()?;

        if self.storage.find_user_by_username(&form.username)?.is_some()
            || self.storage.find_user_by_email(&form.email)?.is_some()
        {
            tracing::debug!(username = %form.username, "Registration rejected: duplicate");
            return Err(TrackerError::conflict(MSG_DUPLICATE_USER));
        }

        let password_hash = hash_password(&form.password)?;
        let user = self
            .storage
            .create_user(&form.username, &form.email, &password_hash)?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Resolve credentials to an identity.
    ///
    /// # Errors
    ///
    /// Returns "Invalid email or password." for an unknown email or a wrong
    /// password alike.
    pub fn authenticate(&self, form: &LoginForm) -> Result<Identity> {
        let user = self.storage.find_user_by_email(&form.email)?;
        match user {
            Some(user) if verify_password(&form.password, &user.password_hash) => {
                tracing::debug!(user_id = user.id, "Authenticated");
                Ok(Identity::new(user.id))
            }
            _ => {
                tracing::warn!(email = %form.email, "Failed login");
                Err(TrackerError::validation("credentials", MSG_BAD_CREDENTIALS))
            }
        }
    }

    /// The user behind an identity.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the account no longer exists.
    pub fn current_user(&self, identity: Identity) -> Result<User> {
        self.storage
            .get_user(identity.user_id)?
            .ok_or_else(|| TrackerError::UserNotFound {
                user: identity.user_id.to_string(),
            })
    }

    /// All users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.storage.list_users()
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Create a project owned by the acting user.
    ///
    /// # Errors
    ///
    /// "Project name is required." or `Conflict` with "Project with this name
    /// already exists.".
    pub fn create_project(&mut self, identity: Identity, form: &ProjectForm) -> Result<Project> {
        form.validate()?;
        let owner = self.current_user(identity)?;

        if self.storage.find_project_by_name(&form.name)?.is_some() {
            return Err(TrackerError::conflict(MSG_DUPLICATE_PROJECT));
        }

        self.storage
            .create_project(&form.name, form.description(), owner.id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        self.storage.list_projects()
    }

    /// # Errors
    ///
    /// Returns `ProjectNotFound` for an unknown id.
    pub fn project(&self, project_id: EntityId) -> Result<Project> {
        self.storage
            .get_project(project_id)?
            .ok_or(TrackerError::ProjectNotFound { id: project_id })
    }

    /// Delete a project. Owner only.
    ///
    /// Without `cascade`, a project that still has issues is refused with
    /// `ProjectHasIssues`. Returns the number of issues deleted with it.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound`, `Forbidden` for non-owners, or `ProjectHasIssues`.
    pub fn delete_project(
        &mut self,
        identity: Identity,
        project_id: EntityId,
        cascade: bool,
    ) -> Result<usize> {
        let project = self.project(project_id)?;
        self.require_owner(identity, &project)?;
        self.storage
            .delete_project(project_id, identity.user_id, cascade)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Add a member to a project. Owner only; `role` defaults to `member`.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound`, `UserNotFound`, `Forbidden`, or `Conflict` with
    /// "User is already a member of this project.".
    pub fn add_member(
        &mut self,
        identity: Identity,
        project_id: EntityId,
        user_id: EntityId,
        role: Option<&str>,
    ) -> Result<ProjectMember> {
        let project = self.project(project_id)?;
        self.require_owner(identity, &project)?;
        self.current_user(Identity::new(user_id))?;

        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_MEMBER_ROLE);
        let member = self
            .storage
            .add_member(project_id, user_id, role, identity.user_id)?;

        tracing::info!(project_id, user_id, role, "Added project member");
        Ok(member)
    }

    /// Remove a member. Owner only. Returns whether a membership existed.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` or `Forbidden`.
    pub fn remove_member(
        &mut self,
        identity: Identity,
        project_id: EntityId,
        user_id: EntityId,
    ) -> Result<bool> {
        let project = self.project(project_id)?;
        self.require_owner(identity, &project)?;
        self.storage
            .remove_member(project_id, user_id, identity.user_id)
    }

    /// # Errors
    ///
    /// `ProjectNotFound` for an unknown project.
    pub fn list_members(&self, project_id: EntityId) -> Result<Vec<MemberView>> {
        self.project(project_id)?;
        let members = self.storage.list_members(project_id)?;
        let ids: Vec<EntityId> = members.iter().map(|m| m.user_id).collect();
        let names = self.storage.user_display_names(&ids)?;

        Ok(members
            .into_iter()
            .map(|member| {
                let username = names
                    .get(&member.user_id)
                    .cloned()
                    .unwrap_or_else(|| format!("id:{}", member.user_id));
                MemberView { member, username }
            })
            .collect())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    /// File an issue in a project as the acting user.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound`, "Title is required." or "Invalid due date format.
    /// Use YYYY-MM-DD.".
    pub fn create_issue(
        &mut self,
        identity: Identity,
        project_id: EntityId,
        form: &NewIssueForm,
    ) -> Result<IssueOutcome> {
        let project = self.project(project_id)?;
        let valid = form.validate()?;
        let reporter = self.current_user(identity)?;

        let issue = self.storage.create_issue(&NewIssue {
            title: valid.title,
            description: valid.description,
            status: Status::default(),
            priority: valid.priority,
            project_id: project.id,
            reporter_id: reporter.id,
            assignee_id: None,
            due_date: valid.due_date,
        })?;

        let detail = created_detail(&issue.title);
        Ok(IssueOutcome { issue, detail })
    }

    /// # Errors
    ///
    /// Returns `IssueNotFound` for an unknown id.
    pub fn issue(&self, issue_id: EntityId) -> Result<Issue> {
        self.storage
            .get_issue(issue_id)?
            .ok_or(TrackerError::IssueNotFound { id: issue_id })
    }

    /// An issue with its project, comments and activity trail.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` for an unknown id.
    pub fn issue_detail(&self, issue_id: EntityId) -> Result<IssueDetail> {
        let issue = self.issue(issue_id)?;
        let project = self.project(issue.project_id)?;
        let comments = self.storage.get_comments(issue_id)?;
        let activities = self.storage.get_activities(issue_id)?;
        Ok(IssueDetail {
            issue,
            project,
            comments,
            activities,
        })
    }

    /// Comment on an issue as the acting user.
    ///
    /// # Errors
    ///
    /// `IssueNotFound` or "Content cannot be empty.".
    pub fn add_comment(
        &mut self,
        identity: Identity,
        issue_id: EntityId,
        form: &CommentForm,
    ) -> Result<CommentOutcome> {
        self.issue(issue_id)?;
        form.validate()?;
        let author = self.current_user(identity)?;

        let comment = self
            .storage
            .add_comment(issue_id, author.id, &form.content)?;
        let detail = crate::storage::activity::comment_detail(&comment.content);

        tracing::info!(issue_id, comment_id = comment.id, "Added comment");
        Ok(CommentOutcome { comment, detail })
    }

    /// Edit an issue's metadata.
    ///
    /// Allowed for the reporter, the project owner, or the current assignee;
    /// the check runs before anything is validated or written.
    ///
    /// # Errors
    ///
    /// `IssueNotFound`, `Forbidden` with "You are not authorized to edit this
    /// issue.", or a form validation failure (including "Invalid assignee
    /// ID." for an id with no user behind it).
    pub fn edit_issue(
        &mut self,
        identity: Identity,
        issue_id: EntityId,
        form: &EditIssueForm,
    ) -> Result<IssueOutcome> {
        let issue = self.issue(issue_id)?;
        let project = self.project(issue.project_id)?;

        if !issue.can_be_edited_by(identity.user_id, &project) {
            tracing::warn!(issue_id, user_id = identity.user_id, "Edit denied");
            return Err(TrackerError::forbidden(MSG_EDIT_FORBIDDEN));
        }

        let update = form.resolve(&issue)?;
        if let Some(assignee_id) = update.assignee_id {
            if self.storage.get_user(assignee_id)?.is_none() {
                return Err(TrackerError::validation("assignee_id", MSG_INVALID_ASSIGNEE));
            }
        }

        let (issue, detail) = self
            .storage
            .update_issue(issue_id, &update, identity.user_id)?;
        Ok(IssueOutcome { issue, detail })
    }

    /// Hard-delete an issue with its comments and activities.
    ///
    /// Allowed for the reporter or the project owner.
    ///
    /// # Errors
    ///
    /// `IssueNotFound` or `Forbidden`.
    pub fn delete_issue(&mut self, identity: Identity, issue_id: EntityId) -> Result<()> {
        let issue = self.issue(issue_id)?;
        let project = self.project(issue.project_id)?;

        if identity.user_id != issue.reporter_id && identity.user_id != project.owner_id {
            tracing::warn!(issue_id, user_id = identity.user_id, "Delete denied");
            return Err(TrackerError::forbidden(MSG_DELETE_FORBIDDEN));
        }

        self.storage.delete_issue(issue_id, identity.user_id)
    }

    /// A filtered page of a project's issues with the filter option lists.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` for an unknown project.
    pub fn list_issues(&self, filters: &IssueFilters) -> Result<IssueListing> {
        let project = self.project(filters.project_id)?;
        let page = self.storage.list_issues(filters)?;
        Ok(IssueListing {
            project,
            page,
            statuses: status_options(),
            priorities: priority_options(),
            users: self.storage.list_users()?,
        })
    }

    fn require_owner(&self, identity: Identity, project: &Project) -> Result<()> {
        if project.owner_id == identity.user_id {
            Ok(())
        } else {
            tracing::warn!(
                project_id = project.id,
                user_id = identity.user_id,
                "Owner-only operation denied"
            );
            Err(TrackerError::forbidden(MSG_OWNER_ONLY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> Tracker {
        Tracker::new(SqliteStorage::open_memory().unwrap())
    }

    fn register(tracker: &mut Tracker, name: &str) -> Identity {
        let user = tracker
            .register(&RegistrationForm {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password: "secret".to_string(),
                confirm: "secret".to_string(),
            })
            .unwrap();
        Identity::new(user.id)
    }

    #[test]
    fn option_lists_match_form_choices() {
        assert_eq!(
            status_options(),
            vec!["Open", "In Progress", "Resolved", "Closed"]
        );
        assert_eq!(priority_options(), vec!["Low", "Medium", "High", "Critical"]);
    }

    #[test]
    fn login_round_trip() {
        let mut tracker = tracker();
        let alice = register(&mut tracker, "alice");

        let ok = tracker
            .authenticate(&LoginForm {
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();
        assert_eq!(ok, alice);

        let err = tracker
            .authenticate(&LoginForm {
                email: "alice@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[test]
    fn edit_by_stranger_is_forbidden_and_writes_nothing() {
        let mut tracker = tracker();
        let alice = register(&mut tracker, "alice");
        let mallory = register(&mut tracker, "mallory");
        let project = tracker
            .create_project(
                alice,
                &ProjectForm {
                    name: "Apollo".to_string(),
                    description: None,
                },
            )
            .unwrap();
        let created = tracker
            .create_issue(
                alice,
                project.id,
                &NewIssueForm {
                    title: "Crash".to_string(),
                    ..NewIssueForm::default()
                },
            )
            .unwrap();

        let form = EditIssueForm {
            title: "Hijacked".to_string(),
            ..EditIssueForm::default()
        };
        let err = tracker
            .edit_issue(mallory, created.issue.id, &form)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden { .. }));
        assert_eq!(err.to_string(), "You are not authorized to edit this issue.");

        let detail = tracker.issue_detail(created.issue.id).unwrap();
        assert_eq!(detail.issue.title, "Crash");
        assert_eq!(detail.activities.len(), 1);
    }

    #[test]
    fn assignee_may_edit() {
        let mut tracker = tracker();
        let alice = register(&mut tracker, "alice");
        let bob = register(&mut tracker, "bob");
        let project = tracker
            .create_project(
                alice,
                &ProjectForm {
                    name: "Apollo".to_string(),
                    description: None,
                },
            )
            .unwrap();
        let created = tracker
            .create_issue(
                alice,
                project.id,
                &NewIssueForm {
                    title: "Crash".to_string(),
                    ..NewIssueForm::default()
                },
            )
            .unwrap();

        let mut form = EditIssueForm::from_issue(&created.issue);
        form.assignee_id = Some(bob.user_id.to_string());
        tracker.edit_issue(alice, created.issue.id, &form).unwrap();

        let mut form = EditIssueForm::from_issue(&tracker.issue(created.issue.id).unwrap());
        form.status = Some("Resolved".to_string());
        let outcome = tracker.edit_issue(bob, created.issue.id, &form).unwrap();
        assert_eq!(outcome.detail, "status: Open -> Resolved");
    }

    #[test]
    fn unknown_assignee_rejected() {
        let mut tracker = tracker();
        let alice = register(&mut tracker, "alice");
        let project = tracker
            .create_project(
                alice,
                &ProjectForm {
                    name: "Apollo".to_string(),
                    description: None,
                },
            )
            .unwrap();
        let created = tracker
            .create_issue(
                alice,
                project.id,
                &NewIssueForm {
                    title: "Crash".to_string(),
                    ..NewIssueForm::default()
                },
            )
            .unwrap();

        let mut form = EditIssueForm::from_issue(&created.issue);
        form.assignee_id = Some("999".to_string());
        let err = tracker
            .edit_issue(alice, created.issue.id, &form)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid assignee ID.");
    }
}
