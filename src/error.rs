//! Error types surfaced by the fetch layer.

/// The error a failed fetch call surfaces once its retries are exhausted.
///
/// Transport failures are wrapped into [`FetchError::Network`] on the last
/// attempt. Rate-limit, API and parsing failures come out as they were
/// raised by that last attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The transport itself failed (DNS, refused connection, TLS, timeout).
    ///
    /// `attempts` is 0 when the request could not be issued at all.
    #[error("{}: {}", network_summary(.attempts), .message)]
    Network { attempts: usize, message: String },

    /// The server answered HTTP 429.
    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    /// The server answered a status other than 200 or 429.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 200, but the body did not decode or decoded to an empty payload.
    #[error("Failed to parse response: {message}")]
    DataParsing { message: String },

    /// The caller passed an argument that can never succeed.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl FetchError {
    pub fn rate_limit() -> Self {
        FetchError::RateLimit {
            message: "Too many requests".to_string(),
        }
    }

    pub fn api(status: u16) -> Self {
        FetchError::Api {
            status,
            message: format!("HTTP {} error", status),
        }
    }

    pub fn data_parsing(message: impl Into<String>) -> Self {
        FetchError::DataParsing {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        FetchError::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn network(attempts: usize, message: impl Into<String>) -> Self {
        FetchError::Network {
            attempts,
            message: message.into(),
        }
    }

    /// HTTP status behind the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RateLimit { .. } => Some(429),
            FetchError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether an outer caller could reasonably try the same call again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::InvalidParameter { .. })
    }
}

/// A failure reported by a [`Transport`](crate::http::Transport) before any
/// HTTP status was available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::new(error.to_string())
    }
}

fn network_summary(attempts: &usize) -> String {
    match *attempts {
        0 => "Request could not be sent".to_string(),
        1 => "Request failed after 1 attempt".to_string(),
        n => format!("Request failed after {} attempts", n),
    }
}
