// Server configuration read from the environment (after loading `.env`).

use std::env;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_CATALOG: &str = "data/catalog.json";
pub const DEFAULT_HISTORY_DB: &str = "data/history.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// CLASSPATH_BIND
    pub bind: String,
    /// CLASSPATH_CATALOG: JSON catalog file.
    pub catalog_path: PathBuf,
    /// CLASSPATH_DB_PATH: optional SQLite catalog, seeded from the JSON
    /// catalog when empty.
    pub catalog_db_path: Option<PathBuf>,
    /// CLASSPATH_HISTORY_DB: plan history log.
    pub history_db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: DEFAULT_BIND.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            catalog_db_path: None,
            history_db_path: PathBuf::from(DEFAULT_HISTORY_DB),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = ServerConfig::default();
        ServerConfig {
            bind: get("CLASSPATH_BIND").unwrap_or(defaults.bind),
            catalog_path: get("CLASSPATH_CATALOG").map(PathBuf::from).unwrap_or(defaults.catalog_path),
            catalog_db_path: get("CLASSPATH_DB_PATH").map(PathBuf::from),
            history_db_path: get("CLASSPATH_HISTORY_DB").map(PathBuf::from).unwrap_or(defaults.history_db_path),
        }
    }
}
