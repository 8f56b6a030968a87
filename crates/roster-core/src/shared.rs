//! Configuration shared by the gateway and the CLI.

use crate::error::StorageError;
use crate::storage::{JsonFileStorage, RecordStorage, SledStorage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which persistence backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Single JSON document (`storage_path/data_file`).
    #[default]
    Json,
    /// Sled database directory (`storage_path/roster_db`).
    Sled,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sled => "sled",
        }
    }
}

/// Application configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Display name used in logs and `/api/v1/status`.
    pub app_name: String,
    /// Bind address for the gateway.
    pub host: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for persisted data.
    pub storage_path: String,
    #[serde(default)]
    pub storage_backend: StorageBackend,
    /// File name of the JSON document inside `storage_path`.
    pub data_file: String,
    /// When true the gateway adds a permissive CORS layer.
    #[serde(default)]
    pub cors_enabled: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            app_name: "Student Roster".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            storage_path: "./data".to_string(),
            storage_backend: StorageBackend::Json,
            data_file: "students.json".to_string(),
            cors_enabled: false,
        }
    }
}

impl RosterConfig {
    /// Load config from file and environment. Precedence: env `ROSTER_*` vars >
    /// file at `ROSTER_CONFIG` (default `config/roster`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("ROSTER_CONFIG").unwrap_or_else(|_| "config/roster".to_string());
        Self::load_from(&config_path)
    }

    /// Same as [`RosterConfig::load`] with an explicit file path (with or without
    /// the `.toml` extension).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, Self::environment())
    }

    /// `ROSTER_PORT`, `ROSTER_STORAGE_BACKEND`, ... Nested keys would use `__`.
    fn environment() -> config::Environment {
        config::Environment::with_prefix("ROSTER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(
        config_path: &str,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_path", defaults.storage_path)?
            .set_default("storage_backend", defaults.storage_backend.as_str())?
            .set_default("data_file", defaults.data_file)?
            .set_default("cors_enabled", defaults.cors_enabled)?;

        let path = Path::new(config_path);
        let with_ext = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_ext.is_file() {
            builder.add_source(config::File::from(with_ext.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(environment)
            .build()?;

        built.try_deserialize()
    }

    /// Location of the data for the configured backend.
    pub fn data_location(&self) -> PathBuf {
        let base = Path::new(&self.storage_path);
        match self.storage_backend {
            StorageBackend::Json => base.join(&self.data_file),
            StorageBackend::Sled => base.join("roster_db"),
        }
    }

    /// Opens the configured storage backend.
    pub fn open_storage(&self) -> Result<Arc<dyn RecordStorage>, StorageError> {
        let location = self.data_location();
        tracing::debug!(
            target: "roster::storage",
            backend = self.storage_backend.as_str(),
            path = %location.display(),
            "opening storage"
        );
        Ok(match self.storage_backend {
            StorageBackend::Json => Arc::new(JsonFileStorage::new(location)),
            StorageBackend::Sled => Arc::new(SledStorage::open_path(location)?),
        })
    }

    /// `host:port` string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
