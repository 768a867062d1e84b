//! General HTTP client for the backend API

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::ClientConfig,
    error::{ApiError, ConfigError},
};

/// Body of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub ai_services: BTreeMap<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// Configured client with a fixed base URL and timeout.
///
/// A bearer token is attached to every request while one is stored. Any
/// `401` clears the stored token, so the caller has to sign in again.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    origin: Url,
    timeout: Duration,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            origin: config.origin(),
            timeout: config.timeout,
            token: Arc::new(RwLock::new(config.auth_token.clone())),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a path relative to the API base.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::Endpoint {
                path: path.to_string(),
                source,
            })
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    /// Attach the bearer token, send, and drop the token on `401`.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, reqwest::Error> {
        let request = match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "Backend rejected credentials, clearing stored token");
            self.set_token(None).await;
        }
        Ok(response)
    }

    /// GET a JSON document relative to the API base.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.fetch_json(url).await
    }

    /// Backend liveness, served from the origin rather than the API base.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self
            .origin
            .join("health")
            .map_err(|source| ApiError::Endpoint {
                path: "health".to_string(),
                source,
            })?;
        self.fetch_json(url).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self
            .send(self.get(url.clone()))
            .await
            .map_err(|e| map_reqwest_error(&url, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub(crate) fn map_reqwest_error(url: &Url, error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        ApiError::Connect {
            url: url.to_string(),
            source: error,
        }
    } else {
        ApiError::Http(error)
    }
}
