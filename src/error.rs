use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ErrorPayload;

/// ApiError
///
/// Every way a backend call can fail. The client never interprets the backend's answer:
/// a rejected request keeps its status and raw body so callers see exactly what the server
/// said.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connection refused, TLS...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend rejected request with status {status}: {body}")]
    Backend {
        status: StatusCode,
        /// Parsed form of `body`, empty when the body was not the usual JSON shape.
        payload: ErrorPayload,
        body: String,
    },

    /// A success response whose body did not match the expected type.
    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// message_or
    ///
    /// The backend's `mensaje` field when the failure carries one, `fallback` otherwise.
    /// This is the only place the error payload shape is looked at.
    pub fn message_or(&self, fallback: &str) -> String {
        self.backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// The backend's `mensaje` field, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Backend { payload, .. } => payload.mensaje.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of a backend rejection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// StoreError
///
/// Failures of the durable token slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Only produced by the in-memory store when configured to fail.
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// ConfigError
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
