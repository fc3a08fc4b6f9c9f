use crate::shared::config::{AppConfig, ConfigError, DEFAULT_ACCEPT_TIMEOUT};
use crate::shared::{Author, StaticIdentity};
use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Viewer configuration
///
/// | Variable | Default |
/// |----------|---------|
/// | `CLIENT_API_URL` | `http://127.0.0.1:3000` |
/// | `ACCEPT_TIMEOUT_MS` | `10000` |
/// | `FEED_DISPLAY_NAME` | none |
/// | `FEED_AVATAR_URL` | empty |
/// | `FEED_IDENTITY_KEY` | none; without it the viewer is read-only |
#[derive(Debug, Clone)]
pub struct Config {
    app: AppConfig,
    author: Option<Author>,
}

impl Config {
    pub fn new(app: AppConfig, author: Option<Author>) -> Self {
        Self { app, author }
    }

    /// Read configuration from the process environment and `.env`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server_url = lookup("CLIENT_API_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let accept_timeout = match lookup("ACCEPT_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "ACCEPT_TIMEOUT_MS",
                    value: raw,
                })?,
            None => DEFAULT_ACCEPT_TIMEOUT,
        };

        let app = AppConfig::builder()
            .server_url(server_url)
            .accept_timeout(accept_timeout)
            .build()?;

        let author = lookup("FEED_IDENTITY_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|identity_key| {
                let display_name = lookup("FEED_DISPLAY_NAME").unwrap_or_else(|| identity_key.clone());
                let avatar_url = lookup("FEED_AVATAR_URL").unwrap_or_default();
                Author::new(display_name, avatar_url, identity_key)
            });

        Ok(Self { app, author })
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn server_url(&self) -> &str {
        &self.app.server_url
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn identity(&self) -> StaticIdentity {
        StaticIdentity::new(self.author.clone())
    }
}
