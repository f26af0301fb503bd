//! Runtime configuration and process bootstrap.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Turn that description into a ready, migrated connection.
//!
//! # Invariants
//! - File logging starts before the database is opened, so `db_open`
//!   events land in the log.
//! - Without `log_dir`, logging is left to the caller.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Storage location of the SQLite database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db: DbLocation,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db: DbLocation::Memory,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl CoreConfig {
    /// Config for a database file, other settings defaulted.
    pub fn with_db_file(path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Starts logging (when `log_dir` is set) and opens the database.
    pub fn bootstrap(&self) -> Result<Connection, BootstrapError> {
        if let Some(log_dir) = self.log_dir.as_ref() {
            init_logging(&self.log_level, log_dir)?;
        }

        let conn = match &self.db {
            DbLocation::Memory => open_db_in_memory()?,
            DbLocation::File(path) => open_db(path)?,
        };
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DbLocation};
    use crate::db::migrations::latest_version;

    #[test]
    fn default_config_uses_memory_db_without_file_logging() {
        let config = CoreConfig::default();
        assert_eq!(config.db, DbLocation::Memory);
        assert!(config.log_dir.is_none());
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn bootstrap_opens_migrated_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::with_db_file(dir.path().join("kinship.db"));

        let conn = config.bootstrap().unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }

    #[test]
    fn config_deserializes_with_defaults_for_missing_fields() {
        let config: CoreConfig =
            serde_json::from_str(r#"{ "db": { "file": "/tmp/kinship.db" } }"#).unwrap();
        assert_eq!(config.db, DbLocation::File("/tmp/kinship.db".into()));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert!(config.log_dir.is_none());
    }
}
