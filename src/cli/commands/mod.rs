//! Command implementations.

pub mod comment;
pub mod completions;
pub mod init;
pub mod issue;
pub mod project;
pub mod user;

use crate::config::Settings;
use crate::error::{Result, TrackerError};
use crate::model::EntityId;
use crate::service::{Identity, Tracker};
use serde::Serialize;

/// Resolve the configured actor to the identity commands act as.
///
/// # Errors
///
/// Returns a validation error when no actor is configured, or
/// `UserNotFound` when the username is not registered.
pub fn require_identity(tracker: &Tracker, settings: &Settings) -> Result<Identity> {
    let username = settings.actor.as_deref().ok_or_else(|| {
        TrackerError::validation(
            "actor",
            "No acting user. Pass --actor <username> or run 'bugdesk user login --save'.",
        )
    })?;
    Ok(Identity::new(user_id_by_name(tracker, username)?))
}

/// # Errors
///
/// Returns `UserNotFound` for an unknown username.
pub fn user_id_by_name(tracker: &Tracker, username: &str) -> Result<EntityId> {
    tracker
        .storage()
        .find_user_by_username(username)?
        .map(|user| user.id)
        .ok_or_else(|| TrackerError::UserNotFound {
            user: username.to_string(),
        })
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
