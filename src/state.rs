//! Shared client state.
//!
//! Everything a command needs to talk to the task API, built once at startup.

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::notify::Notifier;
use crate::store::TokenStore;
use std::sync::Arc;

/// Client state shared by the login flow and the task list.
#[derive(Clone)]
pub struct ClientState {
    /// Configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// HTTP client bound to the configured API base URL.
    pub api: Arc<ApiClient>,
    /// Where the bearer token is persisted between runs.
    pub store: Arc<dyn TokenStore>,
    /// Receives the user-facing success and error notifications.
    pub notifier: Arc<dyn Notifier>,
}
