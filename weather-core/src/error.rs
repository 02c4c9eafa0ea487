//! Error types for the fetch and persistence seams.

use reqwest::StatusCode;
use thiserror::Error;

pub const MSG_RATE_LIMITED: &str =
    "API rate limit exceeded. Please wait a moment before trying again.";
pub const MSG_NOT_FOUND: &str = "City not found. Please try another location.";
pub const MSG_PROVIDER: &str = "Unable to fetch weather data. Please try again later.";
pub const MSG_CONNECTION: &str =
    "Unable to connect to the weather service. Please check your internet connection.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";
pub const MSG_INVALID_RESPONSE: &str = "Invalid response from weather service";

/// Every way a single weather lookup can fail.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("provider rate limit hit (HTTP 429)")]
    RateLimited,

    #[error("city not found (HTTP 404)")]
    NotFound,

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("no response from provider: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("provider response had no usable city name")]
    InvalidResponse,

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::NOT_FOUND => Self::NotFound,
            other => Self::Status(other.as_u16()),
        }
    }

    /// Classify a transport failure raised by reqwest.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status);
        }
        if err.is_timeout() {
            return Self::Timeout(err);
        }
        if err.is_builder() {
            return Self::Unexpected(err.to_string());
        }
        if err.is_connect() || err.is_request() || err.is_body() {
            return Self::Connection(err);
        }
        Self::Unexpected(err.to_string())
    }

    /// Fixed message shown to the user. Never includes transport detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimited => MSG_RATE_LIMITED,
            Self::NotFound => MSG_NOT_FOUND,
            Self::Status(_) => MSG_PROVIDER,
            Self::Connection(_) => MSG_CONNECTION,
            Self::Timeout(_) | Self::Unexpected(_) => MSG_UNEXPECTED,
            Self::InvalidResponse => MSG_INVALID_RESPONSE,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no storage location available: {0}")]
    Unavailable(String),
}
