//! Client error taxonomy.
//!
//! Every failure the client can hit is reduced to a `ClientError`. Callers branch on `ClientError::kind()`;
//! the `Display` output is what ends up in front of the user.

use serde::Serialize;
use thiserror::Error;

use crate::providers::ProviderError;

/// Coarse classification of a `ClientError`, for UI branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Auth,
    Network,
    Server,
    Storage,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Client-side input checks failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The identity provider rejected the user, or the API rejected the session.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure such as a refused connection or a timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered, but not with a usable success.
    #[error("server error: {0}")]
    Server(String),

    /// The local token store could not be read or written.
    #[error("token storage error: {0}")]
    Storage(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Server(_) => ErrorKind::Server,
            ClientError::Storage(_) => ErrorKind::Storage,
            ClientError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<ProviderError> for ClientError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Rejected(reason) => ClientError::Auth(reason),
            ProviderError::Unreachable(reason) => ClientError::Network(reason),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Network(format!("request timed out: {}", e))
        } else if e.is_decode() {
            ClientError::Server(format!("malformed response body: {}", e))
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
