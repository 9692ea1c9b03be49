//! Client startup.
//!
//! Builds the shared state from the configuration and wires it into the
//! login flow and the task list controller.

use std::sync::Arc;
use tracing::debug;

use crate::api::ApiClient;
use crate::auth::Authenticator;
use crate::config::ConfigV1;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::providers::{create_federated_provider, create_identity_provider};
use crate::state::ClientState;
use crate::store::{create_token_store, TokenStore};
use crate::tasks::TaskListController;

/// Builds the client state with the token store described by the configuration.
///
/// # Errors
///
/// Returns a `Validation` error if the API base URL cannot be parsed.
pub fn build_state(
    config: Arc<ConfigV1>,
    notifier: Arc<dyn Notifier>,
) -> Result<ClientState, ClientError> {
    let store = create_token_store(&config.storage);
    build_state_with_store(config, store, notifier)
}

/// Same as [`build_state`], with an explicit token store.
pub fn build_state_with_store(
    config: Arc<ConfigV1>,
    store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<ClientState, ClientError> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    if !store.is_persistent() {
        debug!("Token storage disabled; sessions last for this process only");
    }
    Ok(ClientState {
        config,
        api,
        store,
        notifier,
    })
}

/// Builds the login flow with every configured identity provider. The
/// federated provider is attached only when an ID token for it is given.
pub fn build_authenticator(state: &ClientState, federated_id_token: Option<String>) -> Authenticator {
    let providers = state
        .config
        .identity
        .providers
        .iter()
        .map(create_identity_provider)
        .collect::<Vec<_>>();
    debug!("{} identity provider(s) configured", providers.len());

    let authenticator = Authenticator::new(
        providers,
        state.api.clone(),
        state.store.clone(),
        state.notifier.clone(),
        state.config.auth.clone(),
    );

    match (&state.config.identity.federated, federated_id_token) {
        (Some(federated), Some(id_token)) => {
            authenticator.with_federated(create_federated_provider(federated, id_token))
        }
        _ => authenticator,
    }
}

/// Opens the task list for the stored session.
///
/// # Errors
///
/// Returns an `Auth` error when no usable session is stored, or a `Storage`
/// error when the token store cannot be read.
pub async fn open_task_list(
    state: &ClientState,
    authenticator: &Authenticator,
) -> Result<TaskListController, ClientError> {
    let session = authenticator
        .restore_session()
        .await?
        .ok_or_else(|| ClientError::Auth("not logged in; sign in first".to_string()))?;
    debug!("Restored session for '{}'", session.email);
    Ok(TaskListController::new(
        state.api.clone(),
        session,
        state.notifier.clone(),
    ))
}
