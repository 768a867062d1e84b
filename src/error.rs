use std::path::PathBuf;

use crate::session::StateKind;

/// Rejection of a candidate file at intake. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a valid image file.")]
    NotAnImage { name: String, media_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why the session refused a `select` command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Cannot select a new image while {0}")]
    Busy(StateKind),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: sign in again to continue")]
    Unauthorized,

    #[error("HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Unable to reach {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to deserialize response: {0}")]
    Decode(String),

    #[error("Invalid endpoint path {path:?}: {source}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API URL {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API URL must use http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("Invalid timeout {value:?}: expected a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
