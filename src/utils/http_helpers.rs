use std::future::Future;

use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ClientError;

/// Whether a call carried the session's bearer token. Decides what a 401/403 means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Secured,
}

/// Runs `fut` unless `cancel` fires first, in which case the request future
/// is dropped (aborting the connection) and `Cancelled` is returned.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    if cancel.is_cancelled() {
        return Err(ClientError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        res = fut => res,
    }
}

/// Turns a response into `T`, classifying failures:
/// - 401/403 on a secured call is an `Auth` error,
/// - any other non-2xx is a `Server` error carrying the body's message if it has one,
/// - a body that does not parse as `T` is a `Server` error.
pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    access: Access,
) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if access == Access::Secured
        && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
    {
        return Err(ClientError::Auth(format!(
            "session rejected by server ({}); please log in again",
            status
        )));
    }

    if !status.is_success() {
        debug!("Non-success response {}: {}", status, body);
        let message = body_message(&body).unwrap_or_else(|| format!("unexpected status {}", status));
        return Err(ClientError::Server(message));
    }

    serde_json::from_str(&body)
        .map_err(|e| ClientError::Server(format!("malformed response body: {}", e)))
}

/// Pulls a human-readable `message` (or `error`) field out of a JSON error body.
fn body_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
