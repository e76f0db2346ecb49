//! Property-based tests for edit diffs and comment snippets.
//!
//! Uses proptest to verify that:
//! - An edit that resubmits every field unchanged reads "No changes made."
//! - A title-only edit produces exactly one title descriptor
//! - Comment snippets are at most 50 chars plus "..." and prefix the content

use bugdesk::changes::{IssueSnapshot, NO_CHANGES, change_detail, describe_changes};
use bugdesk::model::{Priority, Status};
use bugdesk::storage::activity::{COMMENT_SNIPPET_CHARS, comment_detail};
use chrono::NaiveDate;
use proptest::prelude::*;

fn priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::KNOWN.to_vec())
}

fn status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::KNOWN.to_vec())
}

fn snapshot() -> impl Strategy<Value = IssueSnapshot> {
    (
        "[A-Za-z0-9 ]{1,40}",
        prop::option::of("[a-z ]{0,80}"),
        priority(),
        status(),
        prop::option::of(1i64..50),
        prop::option::of(0u32..3000),
    )
        .prop_map(|(title, description, priority, status, assignee_id, days)| {
            IssueSnapshot {
                title,
                description,
                priority,
                status,
                assignee_id,
                due_date: days.and_then(|d| {
                    NaiveDate::from_ymd_opt(2024, 1, 1)
                        .and_then(|base| base.checked_add_days(chrono::Days::new(u64::from(d))))
                }),
            }
        })
}

fn names(id: i64) -> Option<String> {
    Some(format!("user{id}"))
}

proptest! {
    #[test]
    fn unchanged_edit_reports_no_changes(before in snapshot()) {
        let after = before.clone();
        prop_assert_eq!(change_detail(&before, &after, names), NO_CHANGES);
    }

    #[test]
    fn title_only_edit_is_single_descriptor(
        before in snapshot(),
        new_title in "[A-Za-z0-9 ]{1,40}",
    ) {
        prop_assume!(new_title != before.title);
        let mut after = before.clone();
        after.title.clone_from(&new_title);

        let changes = describe_changes(&before, &after, names);
        prop_assert_eq!(changes.len(), 1);
        prop_assert_eq!(
            &changes[0],
            &format!("title: '{}' -> '{}'", before.title, new_title)
        );
    }

    #[test]
    fn missing_and_empty_description_are_equal(before in snapshot()) {
        let mut a = before.clone();
        a.description = None;
        let mut b = before;
        b.description = Some(String::new());
        prop_assert_eq!(change_detail(&a, &b, names), NO_CHANGES);
    }

    #[test]
    fn descriptor_count_matches_changed_fields(before in snapshot(), after in snapshot()) {
        let changes = describe_changes(&before, &after, names);
        let expected = [
            before.title != after.title,
            before.description.as_deref().unwrap_or("") != after.description.as_deref().unwrap_or(""),
            before.priority != after.priority,
            before.due_date != after.due_date,
            before.status != after.status,
            before.assignee_id != after.assignee_id,
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count();
        prop_assert_eq!(changes.len(), expected);
    }

    #[test]
    fn comment_snippet_is_bounded_prefix(content in "\\PC{0,120}") {
        let detail = comment_detail(&content);
        let chars = content.chars().count();

        if chars > COMMENT_SNIPPET_CHARS {
            let prefix: String = content.chars().take(COMMENT_SNIPPET_CHARS).collect();
            prop_assert_eq!(detail, format!("{prefix}..."));
        } else {
            prop_assert_eq!(detail, content);
        }
    }
}
