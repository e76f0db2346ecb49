use crate::config::{CONFIG_FILENAME, DEFAULT_DB_FILENAME, WORKSPACE_DIR_NAME};
use crate::error::{Result, TrackerError};
use crate::storage::SqliteStorage;
use std::fs;
use std::path::Path;

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created.
pub fn execute(force: bool, root_dir: Option<&Path>) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let workspace_dir = base_dir.join(WORKSPACE_DIR_NAME);
    let db_path = workspace_dir.join(DEFAULT_DB_FILENAME);

    if workspace_dir.exists() {
        if db_path.exists() {
            if !force {
                return Err(TrackerError::AlreadyInitialized { path: db_path });
            }
            for suffix in ["", "-wal", "-shm"] {
                let path = workspace_dir.join(format!("{DEFAULT_DB_FILENAME}{suffix}"));
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
    } else {
        fs::create_dir(&workspace_dir)?;
    }

    // Creates the file and applies the schema
    SqliteStorage::open(&db_path)?;

    let config_path = workspace_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let config = r#"# bugdesk workspace configuration
# actor: alice
# timezone: "+05:30"
# lock-timeout: 30000
"#;
        fs::write(config_path, config)?;
    }

    let gitignore_path = workspace_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let gitignore = r"# Database
*.db
*.db-shm
*.db-wal
";
        fs::write(gitignore_path, gitignore)?;
    }

    tracing::info!(path = %db_path.display(), "Initialized workspace");
    println!("Initialized bugdesk workspace in {WORKSPACE_DIR_NAME}/");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLayer;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_workspace() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path())).unwrap();

        let workspace = temp_dir.path().join(".bugdesk");
        assert!(workspace.join("bugdesk.db").exists());
        assert!(workspace.join("config.yaml").exists());
        assert!(workspace.join(".gitignore").exists());
    }

    #[test]
    fn test_config_template_has_no_active_keys() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path())).unwrap();

        let layer = ConfigLayer::from_yaml(&temp_dir.path().join(".bugdesk/config.yaml")).unwrap();
        assert!(layer.values.is_empty());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path())).unwrap();

        let err = execute(false, Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, TrackerError::AlreadyInitialized { .. }));
    }

    #[test]
    fn test_init_force_recreates_database() {
        let temp_dir = TempDir::new().unwrap();
        execute(false, Some(temp_dir.path())).unwrap();

        let db_path = temp_dir.path().join(".bugdesk/bugdesk.db");
        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            storage.create_user("alice", "a@example.com", "x").unwrap();
        }

        execute(true, Some(temp_dir.path())).unwrap();

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert!(storage.list_users().unwrap().is_empty());
    }
}
