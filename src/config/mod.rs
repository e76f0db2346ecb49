//! Configuration management for `bugdesk`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`BUGDESK_*`)
//! 3. Workspace config (`.bugdesk/config.yaml`)
//! 4. Defaults

use crate::error::{Result, TrackerError};
use crate::service::Tracker;
use crate::storage::SqliteStorage;
use crate::util::{TrackerClock, parse_offset};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the database and config of one workspace.
pub const WORKSPACE_DIR_NAME: &str = ".bugdesk";
/// Database filename used when no `db` key is configured.
pub const DEFAULT_DB_FILENAME: &str = "bugdesk.db";
/// Workspace config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";
/// Busy timeout applied when none is configured.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

const ENV_PREFIX: &str = "BUGDESK_";
/// Environment variables with the prefix that are not config keys.
const ENV_RESERVED: &[&str] = &["BUGDESK_DIR", "BUGDESK_LOG_FORMAT"];

/// Discover the active `.bugdesk` directory.
///
/// Honors `BUGDESK_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no workspace is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_workspace_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_dir = env::var("BUGDESK_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_workspace_dir_with_env(start, env_dir.as_deref())
}

fn discover_workspace_dir_with_env(
    start: Option<&Path>,
    env_override: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(WORKSPACE_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(TrackerError::NotInitialized)
}

/// One source of configuration values, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        let mut layer = Self::default();
        if let serde_yaml::Value::Mapping(map) = value {
            for (key, value) in map {
                let (Some(key), Some(value)) = (key.as_str(), yaml_scalar_to_string(&value))
                else {
                    continue;
                };
                layer.set(key, value);
            }
        }
        Ok(layer)
    }

    /// Build a layer from `BUGDESK_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();
        for (key, value) in vars {
            if ENV_RESERVED.contains(&key.as_str()) {
                continue;
            }
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value);
            }
        }
        layer
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    /// Non-blank value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub actor: Option<String>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            layer.set("db", path.to_string_lossy());
        }
        if let Some(actor) = &self.actor {
            layer.set("actor", actor.clone());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            layer.set("lock-timeout", lock_timeout.to_string());
        }
        layer
    }
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.set("db", DEFAULT_DB_FILENAME);
    layer.set("lock-timeout", DEFAULT_LOCK_TIMEOUT_MS.to_string());
    layer.set("timezone", "+05:30");
    layer
}

/// Load configuration in precedence order.
///
/// # Errors
///
/// Returns an error if the workspace config file cannot be read or parsed.
pub fn load_config(workspace_dir: &Path, cli: &CliOverrides) -> Result<ConfigLayer> {
    let project = ConfigLayer::from_yaml(&workspace_dir.join(CONFIG_FILENAME))?;
    Ok(ConfigLayer::merge_layers(&[
        default_config_layer(),
        project,
        ConfigLayer::from_env(),
        cli.as_layer(),
    ]))
}

/// Typed settings resolved from a merged layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub workspace_dir: PathBuf,
    pub db_path: PathBuf,
    pub lock_timeout_ms: u64,
    pub clock: TrackerClock,
    pub actor: Option<String>,
}

impl Settings {
    /// # Errors
    ///
    /// Returns a config error for an unparsable lock timeout or timezone.
    pub fn from_layer(workspace_dir: &Path, layer: &ConfigLayer) -> Result<Self> {
        let db = PathBuf::from(layer.get("db").unwrap_or(DEFAULT_DB_FILENAME));
        let db_path = if db.is_absolute() {
            db
        } else {
            workspace_dir.join(db)
        };

        let lock_timeout_ms = match layer.get("lock-timeout") {
            Some(raw) => raw
                .parse()
                .map_err(|_| TrackerError::Config(format!("invalid lock-timeout '{raw}'")))?,
            None => DEFAULT_LOCK_TIMEOUT_MS,
        };

        let clock = match layer.get("timezone") {
            Some(raw) => TrackerClock::with_offset(parse_offset(raw)?),
            None => TrackerClock::default(),
        };

        Ok(Self {
            workspace_dir: workspace_dir.to_path_buf(),
            db_path,
            lock_timeout_ms,
            clock,
            actor: layer.get("actor").map(str::to_string),
        })
    }
}

/// Load settings for a workspace and open its database.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or the database cannot be opened.
pub fn open_storage(
    workspace_dir: &Path,
    cli: &CliOverrides,
) -> Result<(SqliteStorage, Settings)> {
    let layer = load_config(workspace_dir, cli)?;
    let settings = Settings::from_layer(workspace_dir, &layer)?;
    let storage = SqliteStorage::open_with_timeout(&settings.db_path, Some(settings.lock_timeout_ms))?
        .with_clock(settings.clock);
    tracing::debug!(db = %settings.db_path.display(), "Opened workspace storage");
    Ok((storage, settings))
}

/// Discover the workspace from the CWD and open a [`Tracker`] over it.
///
/// # Errors
///
/// Returns `NotInitialized` outside a workspace, or any config/open error.
pub fn open_tracker(cli: &CliOverrides) -> Result<(Tracker, Settings)> {
    let workspace_dir = discover_workspace_dir(None)?;
    let (storage, settings) = open_storage(&workspace_dir, cli)?;
    Ok((Tracker::new(storage), settings))
}

/// Persist `actor` into the workspace `config.yaml`, keeping other keys.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written.
pub fn save_actor(workspace_dir: &Path, username: &str) -> Result<()> {
    let path = workspace_dir.join(CONFIG_FILENAME);
    let mut map = if path.exists() {
        match serde_yaml::from_str(&fs::read_to_string(&path)?)? {
            serde_yaml::Value::Mapping(map) => map,
            _ => serde_yaml::Mapping::new(),
        }
    } else {
        serde_yaml::Mapping::new()
    };

    map.insert(
        serde_yaml::Value::from("actor"),
        serde_yaml::Value::from(username),
    );
    fs::write(&path, serde_yaml::to_string(&map)?)?;
    tracing::info!(path = %path.display(), actor = username, "Saved actor");
    Ok(())
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
