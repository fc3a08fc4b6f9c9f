/**
 * Server Configuration
 *
 * This module handles loading of server configuration from the environment
 * (and a `.env` file when present).
 *
 * # Variables
 *
 * - `SERVER_PORT` - listen port, default 3000
 * - `SERVER_HOST` - listen address, default `0.0.0.0`
 * - `DATABASE_URL` - SQLite URL such as `sqlite://feed.db`; when unset the
 *   server keeps messages in memory
 * - `FANOUT_CAPACITY` - per-topic fan-out buffer, default 1000
 *
 * # Error Handling
 *
 * Malformed values are errors. A configured database that cannot be opened is
 * also an error: silently falling back to memory would lose writes.
 */
use crate::backend::realtime::DEFAULT_CAPACITY;
use crate::backend::store::{MemoryStore, SharedStore, SqliteStore, StoreError};
use crate::shared::ConfigError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub fanout_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database_url: None,
            fanout_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_var(&lookup, "SERVER_HOST")?.unwrap_or(defaults.host);
        let port = parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.port);
        let fanout_capacity = parse_var(&lookup, "FANOUT_CAPACITY")?.unwrap_or(defaults.fanout_capacity);
        if fanout_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "FANOUT_CAPACITY",
                value: "0".to_string(),
            });
        }

        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            host,
            port,
            database_url,
            fanout_capacity,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Open the configured message store
    pub async fn load_store(&self) -> Result<SharedStore, StoreError> {
        match &self.database_url {
            Some(url) => {
                tracing::info!("[Store] Connecting to database...");
                let store = SqliteStore::connect(url).await?;
                tracing::info!("[Store] Database connection pool created successfully");
                Ok(Arc::new(store))
            }
            None => {
                tracing::warn!("[Store] DATABASE_URL not set. Messages will be kept in memory only.");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
    }
}
