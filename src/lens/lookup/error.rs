//! Error types for remote lookups

use thiserror::Error;

/// Failure raised by a [`Transport`](super::Transport) before any HTTP status was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    /// The request could not be built, so nothing was sent
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Unrecoverable lookup failure.
///
/// Any of these aborts the whole lookup, including the remaining identifiers of a
/// sequence. Conditions a source treats as recoverable are logged and turn into
/// "no data" for the affected identifier instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The service rejected the credential (HTTP 401)
    #[error("{service}: unauthorized request: {detail}")]
    Unauthorized { service: &'static str, detail: String },

    /// The service answered HTTP 400 without further explanation
    #[error("{service}: an unknown error has occurred for {identifier}")]
    UnknownRequestError {
        service: &'static str,
        identifier: String,
    },

    /// The service answered HTTP 429 and the source treats it as fatal
    #[error("{service}: too many requests within the rate limit period")]
    RateLimited { service: &'static str },

    #[error("{service}: request timed out for {identifier}")]
    Timeout {
        service: &'static str,
        identifier: String,
    },

    #[error("{service}: connection failed for {identifier}: {reason}")]
    Connection {
        service: &'static str,
        identifier: String,
        reason: String,
    },

    /// The source needs an API key and none was configured
    #[error("{service}: an API key is required")]
    MissingCredential { service: &'static str },
}

impl LookupError {
    pub(crate) fn from_transport(
        service: &'static str,
        identifier: &str,
        error: TransportError,
    ) -> Self {
        match error {
            TransportError::Timeout(_) => LookupError::Timeout {
                service,
                identifier: identifier.to_string(),
            },
            TransportError::Connection(reason) | TransportError::InvalidRequest(reason) => {
                LookupError::Connection {
                    service,
                    identifier: identifier.to_string(),
                    reason,
                }
            }
        }
    }
}
