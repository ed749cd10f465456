//! Binder options and environment-driven server settings.

use crate::error::SettingsError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_DELETED_COLUMN: &str = "deleted";
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct RestormifyOptions {
    /// Path prefix for resources, normalized to `/segment` form (empty means root).
    pub api_base: String,
    /// Boolean field that turns DELETE into a soft delete for models that have it.
    pub deleted_column: Option<String>,
    /// Max request body size in bytes.
    pub body_limit: usize,
}

impl Default for RestormifyOptions {
    fn default() -> Self {
        RestormifyOptions {
            api_base: DEFAULT_API_BASE.to_string(),
            deleted_column: Some(DEFAULT_DELETED_COLUMN.to_string()),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl RestormifyOptions {
    pub fn with_api_base(mut self, base: impl AsRef<str>) -> Self {
        self.api_base = normalize_api_base(base.as_ref());
        self
    }

    pub fn with_deleted_column(mut self, column: Option<impl Into<String>>) -> Self {
        self.deleted_column = column.map(Into::into);
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }
}

/// `api/` -> `/api`, `/` -> `` (root).
pub fn normalize_api_base(base: &str) -> String {
    let trimmed = base.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Settings for a standalone server, read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub models_path: Option<PathBuf>,
    pub options: RestormifyOptions,
}

impl ServerSettings {
    /// Reads `DATABASE_URL`, `BIND_ADDR`, `API_BASE`, `MODELS_PATH`, `DELETED_COLUMN`, `BODY_LIMIT`.
    /// An empty `DELETED_COLUMN` disables soft delete.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://restormify.db".into());
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:1234".into());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| SettingsError::Invalid {
            key: "BIND_ADDR",
            message: format!("{}: {}", bind_raw, e),
        })?;
        let models_path = lookup("MODELS_PATH").filter(|s| !s.is_empty()).map(PathBuf::from);

        let mut options = RestormifyOptions::default();
        if let Some(base) = lookup("API_BASE") {
            options = options.with_api_base(base);
        }
        if let Some(col) = lookup("DELETED_COLUMN") {
            options = options.with_deleted_column(Some(col).filter(|c| !c.is_empty()));
        }
        if let Some(raw) = lookup("BODY_LIMIT") {
            let bytes = raw.parse().map_err(|e: std::num::ParseIntError| SettingsError::Invalid {
                key: "BODY_LIMIT",
                message: format!("{}: {}", raw, e),
            })?;
            options = options.with_body_limit(bytes);
        }

        Ok(ServerSettings {
            database_url,
            bind_addr,
            models_path,
            options,
        })
    }
}
