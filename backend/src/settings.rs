//! Application settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `POSTBOARD_*` environment variables over a
//! configuration file. The listener address carries an OrthoConfig default so
//! an empty environment still loads; the other accessors supply defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PROFILE_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_PROFILE_CACHE_TTL_SECS: u64 = 60;

/// Invalid setting values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POSTBOARD")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// PostgreSQL URL. Without one, records live in process memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Profile cache entry limit; `0` disables the cache.
    pub profile_cache_capacity: Option<u64>,
    /// Seconds a cached profile stays valid.
    pub profile_cache_ttl_secs: Option<u64>,
}

impl AppSettings {
    /// Parsed listener address.
    ///
    /// # Errors
    /// [`SettingsError::BindAddr`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_str();
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Cache capacity, or `None` when caching is switched off.
    pub fn profile_cache_capacity(&self) -> Option<u64> {
        match self
            .profile_cache_capacity
            .unwrap_or(DEFAULT_PROFILE_CACHE_CAPACITY)
        {
            0 => None,
            capacity => Some(capacity),
        }
    }

    pub fn profile_cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.profile_cache_ttl_secs
                .unwrap_or(DEFAULT_PROFILE_CACHE_TTL_SECS),
        )
    }
}
