//! GoBarber API client
//!
//! This crate provides the HTTP client used to talk to the GoBarber backend,
//! and the [`AuthApi`] trait through which the session store reaches the
//! authentication endpoints.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;

pub use auth::{AuthApi, Credentials, NewUser, SessionResponse, User};
pub use client::{ApiClient, ApiClientConfig};

#[cfg(any(test, feature = "mock"))]
pub use auth::MockAuthApi;

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error types for API operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL or path is unusable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status, when the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server rejected the request as unauthorized
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
