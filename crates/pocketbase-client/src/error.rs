// Client error types.
//
// Maps HTTP status codes from the PocketBase record API to typed variants.
// PocketBase reports failures as `{ "code": <status>, "message": "...", "data": {...} }`;
// the message is extracted when present, otherwise the raw body is carried.

use thiserror::Error;

/// Errors that can occur when talking to a PocketBase server.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Network-level error (DNS, connection refused, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// 400 Bad Request — invalid input or failed validation.
    #[error("Bad Request: {message}")]
    BadRequest { message: String },

    /// 401 Unauthorized — missing or invalid credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// 403 Forbidden — collection rules reject the request.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// 404 Not Found — no record matched the id or filter.
    #[error("Not Found: {message}")]
    NotFound { message: String },

    /// Any other non-2xx status.
    #[error("Server Error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Failed to deserialize the response body.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// Create a network error from a reqwest error.
    pub fn network(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }

    /// Build the typed error for a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => Self::BadRequest { message },
            401 => Self::Unauthorized { message },
            403 => Self::Forbidden { message },
            404 => Self::NotFound { message },
            _ => Self::Status { status, message },
        }
    }

    /// Returns `true` for the not-found condition callers translate into
    /// an absent result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get the HTTP status code, if applicable.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
