//! Error types for the crypto API wrapper

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single transport round trip
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,

    /// The request could not be built by the transport
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Last observed failure of a retryable attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Upstream answered with a retryable status
    Status(u16),
    /// The attempt timed out at the transport level
    Timeout,
    /// Connection, DNS, TLS or other transport failure
    Transport(String),
    /// A 2xx response whose body was not valid JSON
    MalformedBody(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Status(status) => write!(f, "HTTP {}", status),
            FailureKind::Timeout => write!(f, "transport timeout"),
            FailureKind::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureKind::MalformedBody(msg) => write!(f, "malformed body: {}", msg),
        }
    }
}

impl From<TransportError> for FailureKind {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => FailureKind::Timeout,
            TransportError::NetworkError(e) if e.is_timeout() => FailureKind::Timeout,
            other => FailureKind::Transport(other.to_string()),
        }
    }
}

/// Errors surfaced to callers of the wrapper
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    /// A required parameter is missing or has the wrong shape
    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    /// An authenticated operation was invoked without credentials
    #[error("Operation {operation} requires credentials")]
    MissingCredentials { operation: String },

    /// The provider has no operation with this name
    #[error("Unknown operation {name} for {provider}")]
    UnknownOperation { provider: String, name: String },

    /// Upstream answered with a status that is never retried
    #[error("Non-retryable response: HTTP {status}: {body}")]
    NonRetryableResponse { status: u16, body: String },

    /// All attempts failed with retryable errors
    #[error("Execution failed after {attempts} attempt(s): {last}")]
    ExecutionFailed { attempts: u32, last: FailureKind },

    /// The per-call time limit was exceeded
    #[error("Call timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// A non-blocking call was cancelled before it resolved
    #[error("Call cancelled")]
    Cancelled,

    /// Provider identifier not recognized
    #[error("API not supported: {0}")]
    UnsupportedProvider(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Creates an InvalidArguments error
    pub fn invalid_arguments(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a MissingCredentials error
    pub fn missing_credentials(operation: &str) -> Self {
        Self::MissingCredentials {
            operation: operation.to_string(),
        }
    }

    /// Creates an UnknownOperation error
    pub fn unknown_operation(provider: &str, name: &str) -> Self {
        Self::UnknownOperation {
            provider: provider.to_string(),
            name: name.to_string(),
        }
    }

    /// Creates a Config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised locally, before any network access
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidArguments { .. }
                | ClientError::MissingCredentials { .. }
                | ClientError::UnknownOperation { .. }
                | ClientError::UnsupportedProvider(_)
                | ClientError::Config(_)
        )
    }
}
