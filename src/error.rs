//! Error types for the Evidentry client

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid backoff policy: {0}")]
    InvalidPolicy(String),

    #[error("{identity} still unconfirmed after {elapsed:?}")]
    ConfirmationTimeout { identity: String, elapsed: Duration },

    #[error("{identity} upload still not visible after {elapsed:?}")]
    UploadTimeout { identity: String, elapsed: Duration },

    #[error("{identity} still unpublished after {elapsed:?}")]
    PublicationTimeout { identity: String, elapsed: Duration },

    #[error("{identity} still not withdrawn after {elapsed:?}")]
    WithdrawalTimeout { identity: String, elapsed: Duration },

    #[error("poll of {identity} cancelled")]
    Cancelled { identity: String },

    #[error("unknown alias in scenario: {alias}")]
    UnknownAlias { alias: String },
}

impl Error {
    /// Whether this error is the remote service saying the resource does
    /// not exist (yet). Upload confirmation treats this as "keep waiting";
    /// every other poll propagates it.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
