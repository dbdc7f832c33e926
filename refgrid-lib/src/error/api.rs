//! API error types

use std::time::Duration;

/// Errors that can occur while talking to a CRUD backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the backend.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message (usually the response body).
        message: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the backend response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The addressed record does not exist in the collection.
    #[error("{collection}/{id} not found")]
    NotFound {
        /// Collection path segment.
        collection: String,
        /// Record identifier.
        id: String,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(ApiError::http(502, "bad gateway").status_code(), Some(502));
        assert_eq!(ApiError::not_found("hospitals", "9").status_code(), Some(404));
        assert_eq!(ApiError::parse("not an array").status_code(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::not_found("hospitals", "9").to_string(),
            "hospitals/9 not found"
        );
        assert_eq!(ApiError::http(500, "boom").to_string(), "HTTP 500: boom");
    }
}
