//! Persistence layer: `SQLite` schema, entity storage, the activity log and
//! the issue filter engine.

pub mod activity;
pub mod query;
pub mod schema;
pub mod sqlite;

pub use query::{AssigneeFilter, IssueFilters, PAGE_SIZE, Page};
pub use sqlite::{MutationContext, NewIssue, SqliteStorage};

use chrono::{DateTime, FixedOffset, NaiveDate};
use rusqlite::types::Type;

use crate::util::TrackerClock;
use crate::util::time::DATE_FORMAT;

/// Read a stored timestamp column, normalised to the clock's offset.
pub(crate) fn read_timestamp(
    row: &rusqlite::Row,
    idx: usize,
    clock: &TrackerClock,
) -> rusqlite::Result<DateTime<FixedOffset>> {
    let raw: String = row.get(idx)?;
    clock
        .from_storage(&raw)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Read a nullable `YYYY-MM-DD` date column.
pub(crate) fn read_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
            })
        })
        .transpose()
}
