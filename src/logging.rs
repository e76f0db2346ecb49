//! Tracing subscriber setup.
//!
//! Verbosity comes from `-v`/`-q`; `RUST_LOG` overrides both when set.
//! Logs go to stderr so stdout stays clean for `--json` output, or to a file
//! when one is given.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Once};

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

static TEST_INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// `BUGDESK_LOG_FORMAT=json` selects JSON lines.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("BUGDESK_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Default filter directive for a verbosity level.
#[must_use]
pub const fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "bugdesk=info,warn",
        2 => "bugdesk=debug,info",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbose, quiet)));

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            (BoxMakeWriter::new(Arc::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(verbose > 1);

    let installed = match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
    };

    installed.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

/// Install a test-friendly subscriber once per process.
///
/// Output goes through the libtest capture writer, so it only shows for
/// failing tests.
pub fn init_test_logging() {
    TEST_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bugdesk=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(level_directive(3, true), "error");
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_directive(0, false), "warn");
        assert_eq!(level_directive(1, false), "bugdesk=info,warn");
        assert_eq!(level_directive(2, false), "bugdesk=debug,info");
        assert_eq!(level_directive(9, false), "trace");
    }

    #[test]
    fn test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("still fine");
    }
}
