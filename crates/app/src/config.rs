//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `RUBICO_DATA_DIR` - Root directory for stored data (default: ./data)
//! - `RUBICO_DB_NAME` - Database namespace (default: rubicoCustomerDB)
//! - `RUBICO_STORE_NAME` - Store namespace within the database (default: customers)
//! - `RUBICO_STORE_BACKEND` - `file` or `memory` (default: file)
//! - `RUBICO_PAGE_SIZE` - Customers per list page (default: 10)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::listing::DEFAULT_PAGE_SIZE;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_DB_NAME: &str = "rubicoCustomerDB";
const DEFAULT_STORE_NAME: &str = "customers";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where customer records are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON files under the data directory.
    #[default]
    File,
    /// Process memory; nothing survives exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend {other:?} (expected file or memory)")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Memory => "memory",
        })
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root directory for file-backed stores
    pub data_dir: PathBuf,
    /// Database namespace
    pub db_name: String,
    /// Store namespace within the database
    pub store_name: String,
    /// Storage backend
    pub backend: StoreBackend,
    /// Customers per list page, at least 1
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            db_name: DEFAULT_DB_NAME.to_string(),
            store_name: DEFAULT_STORE_NAME.to_string(),
            backend: StoreBackend::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = get_env_or_default(&lookup, "RUBICO_STORE_BACKEND", "file")
            .parse::<StoreBackend>()
            .map_err(|e| ConfigError::InvalidEnvVar("RUBICO_STORE_BACKEND".to_string(), e))?;

        let page_size = get_env_or_default(&lookup, "RUBICO_PAGE_SIZE", "10")
            .parse::<usize>()
            .map_err(|e| e.to_string())
            .and_then(|n| {
                if n == 0 {
                    Err("must be at least 1".to_string())
                } else {
                    Ok(n)
                }
            })
            .map_err(|e| ConfigError::InvalidEnvVar("RUBICO_PAGE_SIZE".to_string(), e))?;

        let db_name = get_env_or_default(&lookup, "RUBICO_DB_NAME", DEFAULT_DB_NAME);
        let store_name = get_env_or_default(&lookup, "RUBICO_STORE_NAME", DEFAULT_STORE_NAME);
        for (key, value) in [("RUBICO_DB_NAME", &db_name), ("RUBICO_STORE_NAME", &store_name)] {
            validate_namespace(key, value)?;
        }

        Ok(Self {
            data_dir: PathBuf::from(get_env_or_default(&lookup, "RUBICO_DATA_DIR", DEFAULT_DATA_DIR)),
            db_name,
            store_name,
            backend,
            page_size,
        })
    }

    /// Directory holding this store's documents.
    #[must_use]
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join(&self.db_name).join(&self.store_name)
    }
}

/// Get an environment variable with a default value. Empty counts as unset.
fn get_env_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> String {
    lookup(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Namespaces become directory names.
fn validate_namespace(key: &str, value: &str) -> Result<(), ConfigError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "may only contain letters, digits, '-' and '_'".to_string(),
        ))
    }
}
