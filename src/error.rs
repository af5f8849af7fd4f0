// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for outbound API calls.

use reqwest::StatusCode;

/// Error returned by [`ApiClient`](crate::services::ApiClient) calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network unreachable, DNS failure, connection reset, etc.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// The response is kept so callers can still inspect it (for example to
    /// read a JSON error body after a 401).
    #[error("{status_text}")]
    Status {
        status: StatusCode,
        status_text: String,
        response: Box<reqwest::Response>,
    },

    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiError {
    /// Build a status error from a non-success response.
    pub fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();

        ApiError::Status {
            status,
            status_text,
            response: Box::new(response),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) | ApiError::Decode(e) => e.status(),
            _ => None,
        }
    }

    /// Whether the server reported the session as invalid.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Take the response out of a status error.
    pub fn into_response(self) -> Option<reqwest::Response> {
        match self {
            ApiError::Status { response, .. } => Some(*response),
            _ => None,
        }
    }
}

/// Result type alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;
