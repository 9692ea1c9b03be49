//! Request and response bodies of the task API.

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Body of `POST /auth/jwt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub email: String,
    pub role: String,
}

/// Response of `POST /auth/jwt`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub message: Option<String>,
}

/// Response of `GET /task?email=...`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TaskListResponse {
    #[serde(default)]
    pub data: Vec<Task>,
}

/// Response of the create, update and delete calls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

impl MutationResponse {
    /// The server's message, or `fallback` when it sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Body of `POST /task`. New tasks always start open.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: bool,
    pub email: String,
}
