//! Issue filtering and pagination.
//!
//! A listing is always scoped to one project. Optional status, priority,
//! assignee and title-search predicates are ANDed together; results come
//! newest first in fixed pages of [`PAGE_SIZE`].

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Result;
use crate::model::{EntityId, Issue};
use crate::storage::sqlite::{ISSUE_COLUMNS, SqliteStorage, issue_from_row};

/// Issues per page.
pub const PAGE_SIZE: i64 = 20;

/// How to filter on the assignee column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeFilter {
    /// Only issues nobody is assigned to.
    Unassigned,
    /// Only issues assigned to this user.
    User(EntityId),
    /// The raw filter was neither `unassigned` nor an id: nothing matches.
    NoMatch,
}

impl AssigneeFilter {
    /// Interpret a raw `assignee` query value.
    ///
    /// Empty input means "no assignee filter". Unrecognised text yields
    /// [`AssigneeFilter::NoMatch`] rather than an error.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw == "unassigned" {
            return Some(Self::Unassigned);
        }
        Some(
            raw.parse::<EntityId>()
                .map_or(Self::NoMatch, Self::User),
        )
    }
}

/// Filters for a project's issue listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFilters {
    pub project_id: EntityId,
    /// Exact status match.
    pub status: Option<String>,
    /// Exact priority match.
    pub priority: Option<String>,
    pub assignee: Option<AssigneeFilter>,
    /// Case-insensitive substring of the title.
    pub query: Option<String>,
    /// 1-based page number; values below 1 are treated as 1.
    pub page: i64,
}

impl IssueFilters {
    /// Unfiltered first page of a project.
    #[must_use]
    pub const fn for_project(project_id: EntityId) -> Self {
        Self {
            project_id,
            status: None,
            priority: None,
            assignee: None,
            query: None,
            page: 1,
        }
    }

    /// Build filters from raw request values, treating empty strings as absent.
    #[must_use]
    pub fn from_raw(
        project_id: EntityId,
        status: Option<&str>,
        priority: Option<&str>,
        assignee: Option<&str>,
        query: Option<&str>,
        page: Option<i64>,
    ) -> Self {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);
        Self {
            project_id,
            status: non_empty(status),
            priority: non_empty(priority),
            assignee: assignee.and_then(AssigneeFilter::parse),
            query: non_empty(query),
            page: page.unwrap_or(1),
        }
    }

    #[must_use]
    pub const fn effective_page(&self) -> i64 {
        if self.page < 1 { 1 } else { self.page }
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            items,
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// Escape LIKE wildcards so user text matches literally (with `ESCAPE '\'`).
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl SqliteStorage {
    /// List a project's issues matching `filters`, one page at a time.
    ///
    /// A page past the end yields an empty `items` list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, filters: &IssueFilters) -> Result<Page<Issue>> {
        let page = filters.effective_page();

        if filters.assignee == Some(AssigneeFilter::NoMatch) {
            tracing::debug!(project_id = filters.project_id, "Assignee filter matches nothing");
            return Ok(Page::new(Vec::new(), page, PAGE_SIZE, 0));
        }

        let mut where_clause = String::from(" WHERE project_id = ?");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(filters.project_id)];

        if let Some(ref status) = filters.status {
            where_clause.push_str(" AND status = ?");
            params.push(Box::new(status.clone()));
        }

        if let Some(ref priority) = filters.priority {
            where_clause.push_str(" AND priority = ?");
            params.push(Box::new(priority.clone()));
        }

        match filters.assignee {
            Some(AssigneeFilter::Unassigned) => where_clause.push_str(" AND assignee_id IS NULL"),
            Some(AssigneeFilter::User(id)) => {
                where_clause.push_str(" AND assignee_id = ?");
                params.push(Box::new(id));
            }
            Some(AssigneeFilter::NoMatch) | None => {}
        }

        if let Some(ref query) = filters.query {
            where_clause.push_str(r" AND title LIKE ? ESCAPE '\'");
            params.push(Box::new(format!("%{}%", escape_like(query))));
        }

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();

        let count_sql = format!("SELECT COUNT(*) FROM issues{where_clause}");
        let total: i64 = self
            .conn()
            .query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))?;

        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues{where_clause}");
        let offset = (page - 1).saturating_mul(PAGE_SIZE);
        let _ = write!(
            sql,
            " ORDER BY created_at DESC, id DESC LIMIT {PAGE_SIZE} OFFSET {offset}"
        );

        tracing::debug!(sql = %sql, total, page, "Listing issues");

        let mut stmt = self.conn().prepare(&sql)?;
        let clock = self.clock();
        let items = stmt
            .query_map(params_refs.as_slice(), |row| issue_from_row(row, clock))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page, PAGE_SIZE, total))
    }
}
