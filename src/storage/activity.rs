//! Activity log storage for `bugdesk`.
//!
//! This module implements the per-issue audit trail:
//! - Activity insertion (atomic with the triggering mutation)
//! - Activity retrieval (oldest first, ASC ordering)
//! - The detail texts written for created/commented issues
//!
//! Rows are append-only; they disappear only when their issue is deleted.

use rusqlite::{Connection, Transaction, params};

use crate::error::Result;
use crate::model::{Activity, ActivityAction, EntityId};
use crate::storage::read_timestamp;
use crate::util::{TrackerClock, snippet};

/// Longest comment prefix copied into a "Commented" activity.
pub const COMMENT_SNIPPET_CHARS: usize = 50;

/// Detail text for a freshly created issue.
#[must_use]
pub fn created_detail(title: &str) -> String {
    format!("Issue '{title}' created.")
}

/// Detail text for a new comment: the first 50 characters, with `...`
/// appended when the content is longer.
#[must_use]
pub fn comment_detail(content: &str) -> String {
    snippet(content, COMMENT_SNIPPET_CHARS)
}

/// Insert an activity within a transaction.
///
/// Must run inside the same transaction as the mutation that triggered it.
///
/// # Errors
///
/// Returns an error if the database insert fails.
pub fn insert_activity(
    tx: &Transaction<'_>,
    issue_id: EntityId,
    user_id: EntityId,
    action: &ActivityAction,
    detail: Option<&str>,
    created_at: &str,
) -> Result<i64> {
    tx.execute(
        r"
        INSERT INTO activities (issue_id, user_id, action, detail, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![issue_id, user_id, action.as_str(), detail, created_at],
    )?;

    Ok(tx.last_insert_rowid())
}

/// Get the activities of an issue, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_activities(
    conn: &Connection,
    clock: &TrackerClock,
    issue_id: EntityId,
) -> Result<Vec<Activity>> {
    let mut stmt = conn.prepare(
        r"
        SELECT id, issue_id, user_id, action, detail, created_at
        FROM activities
        WHERE issue_id = ?1
        ORDER BY created_at ASC, id ASC
        ",
    )?;

    let activities = stmt
        .query_map(params![issue_id], |row| activity_from_row(row, clock))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(activities)
}

/// Count the activities recorded for an issue.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_activities(conn: &Connection, issue_id: EntityId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activities WHERE issue_id = ?1",
        params![issue_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn activity_from_row(row: &rusqlite::Row, clock: &TrackerClock) -> rusqlite::Result<Activity> {
    let action: String = row.get(3)?;

    Ok(Activity {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        user_id: row.get(2)?,
        action: ActivityAction::parse(&action),
        detail: row.get(4)?,
        created_at: read_timestamp(row, 5, clock)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    const T0: &str = "2025-01-01T09:00:00.000000+05:30";
    const T1: &str = "2025-01-01T09:05:00.000000+05:30";

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        apply_schema(&conn).expect("Failed to apply schema");
        conn.execute_batch(&format!(
            "INSERT INTO users (username, email, password_hash) VALUES ('alice', 'a@x', 'h');
             INSERT INTO projects (name, created_at, owner_id) VALUES ('Apollo', '{T0}', 1);
             INSERT INTO issues (title, project_id, reporter_id, created_at, updated_at)
                 VALUES ('Crash', 1, 1, '{T0}', '{T0}');"
        ))
        .expect("Failed to seed");
        conn
    }

    #[test]
    fn test_insert_and_list_in_order() {
        let conn = setup_test_db();
        let tx = conn.unchecked_transaction().expect("Failed to start tx");

        insert_activity(&tx, 1, 1, &ActivityAction::Commented, Some("later"), T1).unwrap();
        let id = insert_activity(
            &tx,
            1,
            1,
            &ActivityAction::Created,
            Some(&created_detail("Crash")),
            T0,
        )
        .unwrap();
        tx.commit().expect("Failed to commit");
        assert!(id > 0);

        let clock = TrackerClock::ist();
        let activities = get_activities(&conn, &clock, 1).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].action, ActivityAction::Created);
        assert_eq!(activities[0].detail.as_deref(), Some("Issue 'Crash' created."));
        assert_eq!(activities[1].action, ActivityAction::Commented);
        assert_eq!(count_activities(&conn, 1).unwrap(), 2);
    }

    #[test]
    fn test_rolled_back_activity_not_persisted() {
        let conn = setup_test_db();
        {
            let tx = conn.unchecked_transaction().unwrap();
            insert_activity(&tx, 1, 1, &ActivityAction::Updated, None, T0).unwrap();
            // dropped without commit
        }
        assert_eq!(count_activities(&conn, 1).unwrap(), 0);
    }

    #[test]
    fn test_comment_detail_truncates_at_fifty_chars() {
        assert_eq!(comment_detail("Looks good"), "Looks good");
        let long = "x".repeat(80);
        assert_eq!(comment_detail(&long), format!("{}...", "x".repeat(50)));
    }
}
