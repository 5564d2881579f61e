//! Configuration for the innkeep service.
//!
//! Values come from the process environment. A `.env` file in the current
//! directory (or any parent) is loaded first, so local development can keep
//! `DATABASE_URL` there.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default per-file upload cap: 5 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Default directory uploaded room images are written to.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads/room_images";

/// Default maximum number of pooled Postgres connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection URL (`DATABASE_URL`).
    pub database_url: String,

    /// Port to listen for HTTP requests on (`INNKEEP_PORT`).
    pub port: u16,

    /// Directory uploaded images are stored in (`INNKEEP_UPLOAD_DIR`).
    pub upload_dir: PathBuf,

    /// Per-file upload size cap in bytes (`INNKEEP_MAX_UPLOAD_BYTES`).
    pub max_upload_bytes: usize,

    /// Connection pool size (`INNKEEP_POOL_SIZE`).
    pub pool_size: usize,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            port: parse_or(&lookup, "INNKEEP_PORT", DEFAULT_PORT)?,
            upload_dir: lookup("INNKEEP_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes: parse_or(&lookup, "INNKEEP_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            pool_size: parse_or(&lookup, "INNKEEP_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        })
    }

    /// The database URL with its password masked, for logging.
    pub fn masked_database_url(&self) -> String {
        mask_password(&self.database_url)
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
            value,
        }),
    }
}

/// Mask password in database URL for display
pub fn mask_password(url: &str) -> String {
    // Simple masking: replace password between :// and @
    if let Some(start) = url.find("://") {
        if let Some(at) = url.rfind('@') {
            if at > start {
                let prefix = &url[..start + 3];
                let suffix = &url[at..];
                if let Some(colon) = url[start + 3..at].find(':') {
                    let user = &url[start + 3..start + 3 + colon];
                    return format!("{}{}:***{}", prefix, user, suffix);
                }
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/inn")]))
                .unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/inn"),
            ("INNKEEP_PORT", "8088"),
            ("INNKEEP_UPLOAD_DIR", "/var/lib/innkeep"),
            ("INNKEEP_MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/innkeep"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/inn"),
            ("INNKEEP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "INNKEEP_PORT", .. }));
    }

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://inn:hunter2@db:5432/inn"),
            "postgres://inn:***@db:5432/inn"
        );
        assert_eq!(
            mask_password("postgres://db:5432/inn"),
            "postgres://db:5432/inn"
        );
    }
}
