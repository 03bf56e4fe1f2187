//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

use crate::db::Database;

/// Environment variable naming the SQLite file.
pub const DB_PATH_VAR: &str = "MASTERDESK_DB_PATH";
/// Environment variable listing allowed CORS origins, comma-separated.
pub const CORS_ORIGINS_VAR: &str = "MASTERDESK_CORS_ORIGINS";

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    /// SQLite file. `None` uses the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let db_path = std::env::var(DB_PATH_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = std::env::var(CORS_ORIGINS_VAR)
            .ok()
            .map(|s| parse_origins(&s))
            .filter(|origins| !origins.is_empty());

        Self {
            db_path,
            cors_origins,
        }
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.db_path {
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

fn parse_origins(s: &str) -> Vec<String> {
    s.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
