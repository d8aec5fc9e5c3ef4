//! Error taxonomy for the client library.
//!
//! Library code rejects with structured errors; view-level code (the CLI)
//! is responsible for mapping them to user-facing messages.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the backend or local storage.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure: DNS, connection refused, timeout.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered outside the success range (after any
    /// refresh-and-retry). Carries the raw body text for diagnostics.
    #[error("HTTP {} {} - {}{}", .status.as_u16(), status_text(.status), .url, format_body(.body))]
    Status {
        /// Response status code.
        status: StatusCode,
        /// Resolved request URL.
        url: String,
        /// Response body, read best-effort.
        body: String,
    },

    /// A nominally successful response carried a body that is not the
    /// expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cart file watcher could not be installed.
    #[error("File watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl ClientError {
    /// True for a 401 that survived the one-shot refresh; callers treat
    /// this as "session invalid" and send the user back to login.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }

    /// True when the request failed at the transport level before any
    /// response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// True for a transport-level timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

fn status_text(status: &StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

fn format_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("\n{body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://localhost/api/purchases/x/".to_owned(),
            body: "{\"detail\":\"not found\"}".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 Not Found - http://localhost/api/purchases/x/\n{\"detail\":\"not found\"}"
        );
    }

    #[test]
    fn test_status_error_display_empty_body() {
        let err = ClientError::Status {
            status: StatusCode::UNAUTHORIZED,
            url: "http://localhost/api/me/".to_owned(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 401 Unauthorized - http://localhost/api/me/");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_non_401_is_not_unauthorized() {
        let err = ClientError::Status {
            status: StatusCode::BAD_GATEWAY,
            url: String::new(),
            body: String::new(),
        };
        assert!(!err.is_unauthorized());
    }
}
