//! `bugdesk`: a project issue tracker backed by `SQLite`.
//!
//! Users register, create projects, file issues, comment on them and edit
//! their metadata. Every issue carries an append-only activity trail written
//! in the same transaction as the change it describes.
//!
//! The library is organised leaves first:
//! - [`model`] entity types
//! - [`changes`] the edit diff rendered into audit text
//! - [`storage`] schema, persistence, activity log and issue filtering
//! - [`validation`] form checking and defaults
//! - [`service`] the handler-facing API taking an explicit identity
//! - [`error`] error kinds and their structured form
//! - [`util`] clock, password hashing and text helpers
//!
//! [`cli`], [`config`] and [`logging`] back the `bugdesk` binary.

pub mod changes;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, Result, StructuredError, TrackerError};
