//! `SQLite` storage implementation.

use crate::changes::{IssueSnapshot, change_detail};
use crate::error::{Result, TrackerError};
use crate::model::{
    Activity, ActivityAction, Comment, EntityId, Issue, Priority, Project, ProjectMember, Status,
    User,
};
use crate::storage::activity::{
    comment_detail, count_activities, created_detail, get_activities, insert_activity,
};
use crate::storage::schema::{apply_schema, pin_timestamp_offset};
use crate::storage::{read_date, read_timestamp};
use crate::util::{TrackerClock, format_date};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

pub(crate) const ISSUE_COLUMNS: &str = "id, title, description, status, priority, project_id, \
     reporter_id, assignee_id, created_at, updated_at, due_date";

const DUPLICATE_USER: &str = "Username or email already exists.";
const DUPLICATE_PROJECT: &str = "Project with this name already exists.";
const DUPLICATE_MEMBER: &str = "User is already a member of this project.";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    clock: TrackerClock,
}

/// An activity recorded during a mutation, written just before commit.
#[derive(Debug, Clone)]
pub struct PendingActivity {
    pub issue_id: EntityId,
    pub action: ActivityAction,
    pub detail: Option<String>,
}

/// Context for a mutation operation, tracking side effects.
#[derive(Debug)]
pub struct MutationContext {
    pub op_name: String,
    pub actor_id: Option<EntityId>,
    /// Single server timestamp shared by every row the mutation writes.
    pub now: DateTime<FixedOffset>,
    stamp: String,
    pub activities: Vec<PendingActivity>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str, actor_id: Option<EntityId>, clock: &TrackerClock) -> Self {
        let now = clock.now();
        Self {
            op_name: op_name.to_string(),
            actor_id,
            now,
            stamp: clock.to_storage(now),
            activities: Vec::new(),
        }
    }

    /// Storage form of [`Self::now`].
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.stamp
    }

    pub fn record_activity(
        &mut self,
        issue_id: EntityId,
        action: ActivityAction,
        detail: Option<String>,
    ) {
        self.activities.push(PendingActivity {
            issue_id,
            action,
            detail,
        });
    }
}

/// Fields of an issue about to be filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub project_id: EntityId,
    pub reporter_id: EntityId,
    pub assignee_id: Option<EntityId>,
    pub due_date: Option<NaiveDate>,
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self {
            conn,
            clock: TrackerClock::default(),
        })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn,
            clock: TrackerClock::default(),
        })
    }

    /// Replace the clock used for server-assigned timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: TrackerClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn clock(&self) -> &TrackerClock {
        &self.clock
    }

    pub(crate) const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation inside one IMMEDIATE transaction.
    ///
    /// Runs `f`, appends every activity it recorded on the context, then
    /// commits. Any error drops the transaction, rolling back the entity write
    /// and its activities together.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails (e.g. database error, logic error).
    pub fn mutate<F, R>(&mut self, op: &str, actor_id: Option<EntityId>, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        check_timestamp_offset(&tx, &self.clock)?;
        let mut ctx = MutationContext::new(op, actor_id, &self.clock);

        let result = f(&tx, &mut ctx)?;

        for activity in &ctx.activities {
            let user_id = ctx.actor_id.ok_or_else(|| {
                TrackerError::Other(anyhow::anyhow!(
                    "{op}: activity recorded without an acting user"
                ))
            })?;
            insert_activity(
                &tx,
                activity.issue_id,
                user_id,
                &activity.action,
                activity.detail.as_deref(),
                ctx.timestamp(),
            )?;
        }

        tx.commit()?;

        tracing::debug!(
            op = %ctx.op_name,
            actor = ?ctx.actor_id,
            activities = ctx.activities.len(),
            "Committed mutation"
        );

        Ok(result)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the username or email is taken.
    pub fn create_user(&mut self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let id = self.mutate("create_user", None, |tx, _ctx| {
            tx.execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
                params![username, email, password_hash],
            )
            .map_err(|err| unique_conflict(err, DUPLICATE_USER))?;
            Ok(tx.last_insert_rowid())
        })?;

        self.get_user(id)?.ok_or(TrackerError::UserNotFound {
            user: id.to_string(),
        })
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&self, id: EntityId) -> Result<Option<User>> {
        self.query_user("id = ?1", &id)
    }

    /// Find a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("email = ?1", &email)
    }

    /// Find a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_user("username = ?1", &username)
    }

    /// All users ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, email, password_hash FROM users ORDER BY username ASC",
        )?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Map user ids to usernames; unknown ids are simply absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn user_display_names(&self, ids: &[EntityId]) -> Result<HashMap<EntityId, String>> {
        display_names(&self.conn, ids)
    }

    fn query_user(&self, predicate: &str, value: &dyn rusqlite::ToSql) -> Result<Option<User>> {
        let sql = format!("SELECT id, username, email, password_hash FROM users WHERE {predicate}");
        let user = self
            .conn
            .query_row(&sql, [value], user_from_row)
            .optional()?;
        Ok(user)
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// Create a project owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if another project already has this name.
    pub fn create_project(
        &mut self,
        name: &str,
        description: Option<&str>,
        owner_id: EntityId,
    ) -> Result<Project> {
        let id = self.mutate("create_project", Some(owner_id), |tx, ctx| {
            tx.execute(
                "INSERT INTO projects (name, description, created_at, owner_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, description, ctx.timestamp(), owner_id],
            )
            .map_err(|err| unique_conflict(err, DUPLICATE_PROJECT))?;
            Ok(tx.last_insert_rowid())
        })?;

        tracing::info!(project_id = id, name, "Created project");
        self.get_project(id)?
            .ok_or(TrackerError::ProjectNotFound { id })
    }

    /// Get a project by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_project(&self, id: EntityId) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at, owner_id FROM projects WHERE id = ?1",
                params![id],
                |row| project_from_row(row, &self.clock),
            )
            .optional()?;
        Ok(project)
    }

    /// Find a project by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at, owner_id FROM projects WHERE name = ?1",
                params![name],
                |row| project_from_row(row, &self.clock),
            )
            .optional()?;
        Ok(project)
    }

    /// All projects, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at, owner_id
             FROM projects
             ORDER BY created_at DESC, id DESC",
        )?;
        let projects = stmt
            .query_map([], |row| project_from_row(row, &self.clock))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Number of issues filed against a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_issues_in_project(&self, project_id: EntityId) -> Result<usize> {
        count_project_issues(&self.conn, project_id)
    }

    /// Delete a project and its memberships.
    ///
    /// A project that still has issues is only deleted when `cascade` is set;
    /// its issues (and through them their comments and activities) then go in
    /// the same transaction. Returns the number of issues removed.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` for an unknown id and `ProjectHasIssues` when
    /// issues remain and `cascade` is false.
    pub fn delete_project(
        &mut self,
        project_id: EntityId,
        actor_id: EntityId,
        cascade: bool,
    ) -> Result<usize> {
        let removed = self.mutate("delete_project", Some(actor_id), |tx, _ctx| {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM projects WHERE id = ?1",
                    params![project_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Err(TrackerError::ProjectNotFound { id: project_id });
            }

            let count = count_project_issues(tx, project_id)?;
            if count > 0 && !cascade {
                return Err(TrackerError::ProjectHasIssues {
                    id: project_id,
                    count,
                });
            }

            tx.execute(
                "DELETE FROM issues WHERE project_id = ?1",
                params![project_id],
            )?;
            tx.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
            Ok(count)
        })?;

        tracing::info!(project_id, issues_removed = removed, "Deleted project");
        Ok(removed)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Add `user_id` to a project with `role`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the user is already a member.
    pub fn add_member(
        &mut self,
        project_id: EntityId,
        user_id: EntityId,
        role: &str,
        actor_id: EntityId,
    ) -> Result<ProjectMember> {
        let id = self.mutate("add_member", Some(actor_id), |tx, _ctx| {
            tx.execute(
                "INSERT INTO project_members (project_id, user_id, role) VALUES (?1, ?2, ?3)",
                params![project_id, user_id, role],
            )
            .map_err(|err| unique_conflict(err, DUPLICATE_MEMBER))?;
            Ok(tx.last_insert_rowid())
        })?;

        Ok(ProjectMember {
            id,
            project_id,
            user_id,
            role: role.to_string(),
        })
    }

    /// Remove a membership. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub fn remove_member(
        &mut self,
        project_id: EntityId,
        user_id: EntityId,
        actor_id: EntityId,
    ) -> Result<bool> {
        self.mutate("remove_member", Some(actor_id), |tx, _ctx| {
            let removed = tx.execute(
                "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Memberships of a project in the order they were granted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_members(&self, project_id: EntityId) -> Result<Vec<ProjectMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, user_id, role FROM project_members
             WHERE project_id = ?1 ORDER BY id ASC",
        )?;
        let members = stmt
            .query_map(params![project_id], |row| {
                Ok(ProjectMember {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    user_id: row.get(2)?,
                    role: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn is_member(&self, project_id: EntityId, user_id: EntityId) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ========================================================================
    // Issues
    // ========================================================================

    /// File a new issue and its "Created" activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. a dangling project or user
    /// reference).
    pub fn create_issue(&mut self, issue: &NewIssue) -> Result<Issue> {
        let id = self.mutate("create_issue", Some(issue.reporter_id), |tx, ctx| {
            tx.execute(
                "INSERT INTO issues (
                    title, description, status, priority, project_id, reporter_id,
                    assignee_id, created_at, updated_at, due_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)",
                params![
                    issue.title,
                    issue.description,
                    issue.status.as_str(),
                    issue.priority.as_str(),
                    issue.project_id,
                    issue.reporter_id,
                    issue.assignee_id,
                    ctx.timestamp(),
                    issue.due_date.map(format_date),
                ],
            )?;
            let id = tx.last_insert_rowid();

            ctx.record_activity(
                id,
                ActivityAction::Created,
                Some(created_detail(&issue.title)),
            );

            Ok(id)
        })?;

        tracing::info!(issue_id = id, project_id = issue.project_id, "Created issue");
        self.get_issue(id)?.ok_or(TrackerError::IssueNotFound { id })
    }

    /// Get an issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, id: EntityId) -> Result<Option<Issue>> {
        fetch_issue(&self.conn, &self.clock, id)
    }

    /// Replace the editable fields of an issue.
    ///
    /// Diffs the stored values against `update`, writes the new values with a
    /// fresh `updated_at`, and records an "Updated" activity carrying the diff
    /// text. Returns the stored issue and that text.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist, or a database error
    /// if the update fails.
    pub fn update_issue(
        &mut self,
        id: EntityId,
        update: &IssueSnapshot,
        actor_id: EntityId,
    ) -> Result<(Issue, String)> {
        let clock = self.clock;
        let detail = self.mutate("update_issue", Some(actor_id), |tx, ctx| {
            let current =
                fetch_issue(tx, &clock, id)?.ok_or(TrackerError::IssueNotFound { id })?;
            let before = IssueSnapshot::from(&current);

            let ids: Vec<EntityId> = [before.assignee_id, update.assignee_id]
                .into_iter()
                .flatten()
                .collect();
            let names = display_names(tx, &ids)?;
            let detail = change_detail(&before, update, |user_id| names.get(&user_id).cloned());

            tx.execute(
                "UPDATE issues SET
                    title = ?1, description = ?2, status = ?3, priority = ?4,
                    assignee_id = ?5, due_date = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    update.title,
                    update.description,
                    update.status.as_str(),
                    update.priority.as_str(),
                    update.assignee_id,
                    update.due_date.map(format_date),
                    ctx.timestamp(),
                    id,
                ],
            )?;

            ctx.record_activity(id, ActivityAction::Updated, Some(detail.clone()));
            Ok(detail)
        })?;

        tracing::info!(issue_id = id, actor_id, detail = %detail, "Updated issue");
        let issue = self.get_issue(id)?.ok_or(TrackerError::IssueNotFound { id })?;
        Ok((issue, detail))
    }

    /// Hard-delete an issue together with its comments and activities.
    ///
    /// The project and the reporter are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist.
    pub fn delete_issue(&mut self, id: EntityId, actor_id: EntityId) -> Result<()> {
        self.mutate("delete_issue", Some(actor_id), |tx, _ctx| {
            let removed = tx.execute("DELETE FROM issues WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(TrackerError::IssueNotFound { id });
            }
            Ok(())
        })?;

        tracing::info!(issue_id = id, actor_id, "Deleted issue");
        Ok(())
    }

    // ========================================================================
    // Comments and activities
    // ========================================================================

    /// Add a comment and its "Commented" activity.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue doesn't exist.
    pub fn add_comment(
        &mut self,
        issue_id: EntityId,
        user_id: EntityId,
        content: &str,
    ) -> Result<Comment> {
        let clock = self.clock;
        self.mutate("add_comment", Some(user_id), |tx, ctx| {
            let exists = tx
                .query_row(
                    "SELECT 1 FROM issues WHERE id = ?1",
                    params![issue_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Err(TrackerError::IssueNotFound { id: issue_id });
            }

            tx.execute(
                "INSERT INTO comments (issue_id, user_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![issue_id, user_id, content, ctx.timestamp()],
            )?;
            let comment_id = tx.last_insert_rowid();

            ctx.record_activity(
                issue_id,
                ActivityAction::Commented,
                Some(comment_detail(content)),
            );

            fetch_comment(tx, &clock, comment_id)
        })
    }

    /// Comments on an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_comments(&self, issue_id: EntityId) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, user_id, content, created_at
             FROM comments
             WHERE issue_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let comments = stmt
            .query_map(params![issue_id], |row| comment_from_row(row, &self.clock))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Activities of an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_activities(&self, issue_id: EntityId) -> Result<Vec<Activity>> {
        get_activities(&self.conn, &self.clock, issue_id)
    }

    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_activities(&self, issue_id: EntityId) -> Result<i64> {
        count_activities(&self.conn, issue_id)
    }
}

/// Turn a UNIQUE constraint failure into a user-facing conflict.
fn unique_conflict(err: rusqlite::Error, message: &str) -> TrackerError {
    if is_unique_violation(&err) {
        TrackerError::conflict(message)
    } else {
        TrackerError::Database(err)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn display_names(conn: &Connection, ids: &[EntityId]) -> Result<HashMap<EntityId, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut sql = String::from("SELECT id, username FROM users WHERE id IN (");
    for i in 0..ids.len() {
        if i > 0 {
            sql.push(',');
        }
        let _ = write!(sql, "?{}", i + 1);
    }
    sql.push(')');

    let mut stmt = conn.prepare(&sql)?;
    let names = stmt
        .query_map(rusqlite::params_from_iter(ids), |row| {
            Ok((row.get::<_, EntityId>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<HashMap<_, _>, _>>()?;
    Ok(names)
}

fn count_project_issues(conn: &Connection, project_id: EntityId) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM issues WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Refuse writes whose clock offset differs from the one already stored.
///
/// Listing order compares timestamps as text, which only matches time order
/// when every row carries the same offset.
fn check_timestamp_offset(conn: &Connection, clock: &TrackerClock) -> Result<()> {
    let configured = clock.offset();
    let pinned = pin_timestamp_offset(conn, configured.local_minus_utc())?;
    if pinned == configured.local_minus_utc() {
        return Ok(());
    }
    let stored = FixedOffset::east_opt(pinned)
        .map_or_else(|| format!("{pinned}s"), |offset| offset.to_string());
    tracing::warn!(%stored, %configured, "Timezone differs from database timestamps");
    Err(TrackerError::Config(format!(
        "timezone {configured} does not match this database's timestamps ({stored}); \
         set `timezone` back to {stored}"
    )))
}

fn fetch_issue(conn: &Connection, clock: &TrackerClock, id: EntityId) -> Result<Option<Issue>> {
    let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
    let issue = conn
        .query_row(&sql, params![id], |row| issue_from_row(row, clock))
        .optional()?;
    Ok(issue)
}

fn fetch_comment(tx: &Transaction<'_>, clock: &TrackerClock, comment_id: i64) -> Result<Comment> {
    tx.query_row(
        "SELECT id, issue_id, user_id, content, created_at FROM comments WHERE id = ?1",
        params![comment_id],
        |row| comment_from_row(row, clock),
    )
    .map_err(TrackerError::from)
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

fn project_from_row(row: &rusqlite::Row, clock: &TrackerClock) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: read_timestamp(row, 3, clock)?,
        owner_id: row.get(4)?,
    })
}

fn comment_from_row(row: &rusqlite::Row, clock: &TrackerClock) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        user_id: row.get(2)?,
        content: row.get(3)?,
        created_at: read_timestamp(row, 4, clock)?,
    })
}

/// Map a row selected with [`ISSUE_COLUMNS`].
pub(crate) fn issue_from_row(row: &rusqlite::Row, clock: &TrackerClock) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: parse_status(&row.get::<_, String>(3)?),
        priority: parse_priority(&row.get::<_, String>(4)?),
        project_id: row.get(5)?,
        reporter_id: row.get(6)?,
        assignee_id: row.get(7)?,
        created_at: read_timestamp(row, 8, clock)?,
        updated_at: read_timestamp(row, 9, clock)?,
        due_date: read_date(row, 10)?,
    })
}

fn parse_status(s: &str) -> Status {
    Status::from_stored(s)
}

fn parse_priority(s: &str) -> Priority {
    Priority::from_stored(s)
}

#[cfg(test)]
impl SqliteStorage {
    /// Execute raw SQL for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL fails.
    pub fn execute_test_sql(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}
