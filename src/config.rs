//! Client configuration: defaults, `.env`/environment, then CLI overrides.

use std::{env, time::Duration};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "SHELFSCAN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "SHELFSCAN_TIMEOUT_SECS";
pub const ENV_AUTH_TOKEN: &str = "SHELFSCAN_AUTH_TOKEN";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Always ends in `/` so relative endpoint joins keep the base path.
    pub base_url: Url,
    pub timeout: Duration,
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(&format!("{}/", DEFAULT_API_URL))
                .expect("default API URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Load `.env` if present, then read `SHELFSCAN_*` variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(url) = env::var(ENV_API_URL) {
            config.base_url = parse_base_url(&url)?;
        }
        if let Ok(secs) = env::var(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout(&secs)?;
        }
        config.auth_token = env::var(ENV_AUTH_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty());
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Scheme + host + port of the base URL, where `/health` lives.
    pub fn origin(&self) -> Url {
        let mut origin = self.base_url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }
}

pub fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: value.to_string(),
        }),
    }
}
