//! Error types for client operations.
//!
//! Errors are categorized so the command layer can give appropriate advice.
//! Nothing is retried automatically.

use std::fmt;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (transient).
    Network,
    /// Credentials rejected or token exchange failed.
    Auth,
    /// Requested entity or path does not exist.
    NotFound,
    /// Server answered with something we could not decode.
    InvalidResponse,
    /// Missing or malformed client configuration.
    Config,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Entity not found",
            Self::InvalidResponse => "Unexpected response from the API",
            Self::Config => "Invalid client configuration",
            Self::Other => "Unknown error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your connection and the API URL, then try again",
            Self::Auth => "Verify SYNQ_CLIENT_ID and SYNQ_CLIENT_SECRET",
            Self::NotFound => "Check the monitored paths in your YAML files",
            Self::InvalidResponse => "Make sure the API URL points at a compatible server",
            Self::Config => "Set the missing values via flags, environment or config file",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// An RPC call returned an error.
    #[error("{method} failed: {message}")]
    Rpc {
        /// Fully-qualified method, e.g. `monitors.v1/BatchCreateMonitor`.
        method: String,
        /// Error message.
        message: String,
    },

    /// OAuth token exchange failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API URL could not be used.
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http {
                status: Some(401 | 403),
                ..
            } => ErrorCategory::Auth,
            Error::Http {
                status: Some(404), ..
            } => ErrorCategory::NotFound,
            Error::Http { .. } => ErrorCategory::Network,
            Error::Rpc { .. } => ErrorCategory::Other,
            Error::Auth(_) => ErrorCategory::Auth,
            Error::InvalidUrl { .. } => ErrorCategory::Config,
            Error::InvalidResponse(_) => ErrorCategory::InvalidResponse,
            Error::Other(_) => ErrorCategory::Other,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_description_and_advice() {
        for category in [
            ErrorCategory::Network,
            ErrorCategory::Auth,
            ErrorCategory::NotFound,
            ErrorCategory::InvalidResponse,
            ErrorCategory::Config,
            ErrorCategory::Other,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.advice().is_empty());
        }
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Network);
        assert!(display.contains("Network"));
    }

    #[test]
    fn test_http_status_categories() {
        assert_eq!(
            Error::http("HTTP 401", Some(401)).category(),
            ErrorCategory::Auth
        );
        assert_eq!(
            Error::http("HTTP 404", Some(404)).category(),
            ErrorCategory::NotFound
        );
        let err = Error::http("connection reset", None);
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_rpc_error_display() {
        let err = Error::Rpc {
            method: "monitors.v1/BatchCreateMonitor".to_string(),
            message: "invalid schedule".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "monitors.v1/BatchCreateMonitor failed: invalid schedule"
        );
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.category(), ErrorCategory::InvalidResponse);
    }
}
