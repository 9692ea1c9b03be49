use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::form::LoginForm;
use crate::api::ApiClient;
use crate::config::AuthConfig;
use crate::error::ClientError;
use crate::models::{Session, TokenRequest};
use crate::notify::{Notification, Notifier};
use crate::providers::{FederatedProvider, Identity, IdentityProvider, ProviderError};
use crate::store::TokenStore;
use crate::utils::http_helpers::cancellable;

/// Where to go after a login when nothing else was requested.
pub const DEFAULT_REDIRECT: &str = "/";

/// A successful login: the new session and where to send the user next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub session: Session,
    pub redirect_to: String,
}

/// Binds the login form to the identity providers and trades a verified
/// identity for an API token.
pub struct Authenticator {
    providers: Vec<Box<dyn IdentityProvider>>,
    federated: Option<Box<dyn FederatedProvider>>,
    api: Arc<ApiClient>,
    store: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
}

impl Authenticator {
    pub fn new(
        providers: Vec<Box<dyn IdentityProvider>>,
        api: Arc<ApiClient>,
        store: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        Authenticator {
            providers,
            federated: None,
            api,
            store,
            notifier,
            config,
        }
    }

    pub fn with_federated(mut self, provider: Box<dyn FederatedProvider>) -> Self {
        self.federated = Some(provider);
        self
    }

    /// Email/password login. Invalid input never reaches the network; any
    /// later failure is recorded on the form and returned.
    pub async fn submit_credentials(
        &self,
        form: &mut LoginForm,
        from: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<LoginOutcome, ClientError> {
        form.begin_attempt();
        form.validate()?;

        let result = async {
            let identity = self
                .verify_credentials(form.email.trim(), &form.password, cancel)
                .await?;
            self.exchange(&identity, from, cancel).await
        }
        .await;

        match result {
            Ok(outcome) => {
                form.reset();
                Ok(outcome)
            }
            Err(e) => {
                warn!("Login failed for '{}': {}", form.email.trim(), e);
                form.fail(e.clone());
                Err(e)
            }
        }
    }

    /// Login through the federated provider; the email comes from the
    /// federated identity, not from the form. Failures land on the form.
    pub async fn submit_federated(
        &self,
        form: &mut LoginForm,
        from: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<LoginOutcome, ClientError> {
        form.begin_attempt();

        let result = async {
            let provider = self
                .federated
                .as_ref()
                .ok_or_else(|| ClientError::Auth("No federated provider configured".to_string()))?;

            let attempt = timeout(self.provider_timeout(), provider.sign_in());
            let identity = cancellable(cancel, async {
                match attempt.await {
                    Ok(Ok(identity)) => Ok(identity),
                    Ok(Err(e)) => Err(ClientError::from(e)),
                    Err(_) => Err(ClientError::Network(format!(
                        "Provider '{}' timed out",
                        provider.get_name()
                    ))),
                }
            })
            .await?;

            self.exchange(&identity, from, cancel).await
        }
        .await;

        result.map_err(|e| {
            warn!("Federated login failed: {}", e);
            form.fail(e.clone());
            e
        })
    }

    /// Rebuilds the session from the stored token. A missing or unusable
    /// token yields `None`.
    pub async fn restore_session(&self) -> Result<Option<Session>, ClientError> {
        let token = match self.store.load().await.map_err(ClientError::Storage)? {
            Some(token) => token,
            None => return Ok(None),
        };
        match Session::from_token(&token) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                debug!("Ignoring stored token: {}", e);
                Ok(None)
            }
        }
    }

    /// Drops the stored token. Returns whether there was one.
    pub async fn logout(&self) -> Result<bool, ClientError> {
        let existed = self.store.clear().await.map_err(ClientError::Storage)?;
        info!("Logged out (token was stored: {})", existed);
        Ok(existed)
    }

    fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_in_ms)
    }

    /// Tries every identity provider at once; the first one to accept wins
    /// and the rest are dropped. Each attempt is bounded by the auth timeout.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Identity, ClientError> {
        if self.providers.is_empty() {
            return Err(ClientError::Auth(
                "No identity provider configured".to_string(),
            ));
        }

        let timeout_duration = self.provider_timeout();
        let mut attempts = self
            .providers
            .iter()
            .map(|provider| {
                let name = provider.get_name().to_owned();
                async move {
                    match timeout(timeout_duration, provider.sign_in(email, password)).await {
                        Ok(Ok(identity)) => Ok(identity),
                        Ok(Err(e)) => {
                            debug!("Provider '{}' failed sign-in: {}", name, e);
                            Err(e)
                        }
                        Err(_) => Err(ProviderError::Unreachable(format!(
                            "Provider '{}' timed out",
                            name
                        ))),
                    }
                }
            })
            .collect::<FuturesUnordered<_>>();

        cancellable(cancel, async {
            let mut failures = Vec::with_capacity(self.providers.len());
            while let Some(attempt) = attempts.next().await {
                match attempt {
                    Ok(identity) => {
                        info!(
                            "Provider '{}' verified '{}'",
                            identity.provider, identity.email
                        );
                        return Ok(identity);
                    }
                    Err(e) => failures.push(e),
                }
            }
            Err(combine_failures(failures))
        })
        .await
    }

    /// Exchanges a verified identity for an API token, persists it, and
    /// announces the login.
    async fn exchange(
        &self,
        identity: &Identity,
        from: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<LoginOutcome, ClientError> {
        let request = TokenRequest {
            email: identity.email.clone(),
            role: self.config.role.clone(),
        };
        let response = self.api.issue_token(&request, cancel).await?;

        if !response.success {
            return Err(ClientError::Server(
                response
                    .message
                    .unwrap_or_else(|| "Token issuance was rejected".to_string()),
            ));
        }
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Server("Token endpoint returned no token".to_string()))?;

        self.store.save(&token).await.map_err(ClientError::Storage)?;

        let title = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Logged in successfully".to_string());
        self.notifier.notify(Notification::success(title));

        info!("Logged in as '{}' via '{}'", identity.email, identity.provider);
        Ok(LoginOutcome {
            session: Session::new(identity.email.clone(), token),
            redirect_to: redirect_target(from),
        })
    }
}

/// Folds the failures of every provider into one error. A single rejection
/// makes it an `Auth` error; only when no provider could be asked at all is
/// it a `Network` error.
fn combine_failures(failures: Vec<ProviderError>) -> ClientError {
    let (rejections, unreachable): (Vec<_>, Vec<_>) =
        failures.into_iter().partition(ProviderError::is_rejection);

    match rejections.into_iter().next() {
        Some(rejection) => ClientError::from(rejection),
        None => ClientError::Network(
            unreachable
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
    }
}

/// The page the user originally asked for, if it is a local path; otherwise `/`.
fn redirect_target(from: Option<&str>) -> String {
    match from.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_defaults_to_root() {
        assert_eq!(redirect_target(None), "/");
        assert_eq!(redirect_target(Some("")), "/");
    }

    #[test]
    fn redirect_keeps_local_paths_only() {
        assert_eq!(redirect_target(Some("/task")), "/task");
        assert_eq!(redirect_target(Some("https://evil.example.com")), "/");
        assert_eq!(redirect_target(Some("//evil.example.com")), "/");
    }

    #[test]
    fn any_rejection_makes_it_an_auth_failure() {
        let err = combine_failures(vec![
            ProviderError::Unreachable("Provider 'remote' timed out".into()),
            ProviderError::Rejected("Wrong email or password".into()),
        ]);
        assert_eq!(err, ClientError::Auth("Wrong email or password".into()));
    }

    #[test]
    fn all_unreachable_is_a_network_failure() {
        let err = combine_failures(vec![
            ProviderError::Unreachable("Provider 'a' timed out".into()),
            ProviderError::Unreachable("Error sending request".into()),
        ]);
        assert_eq!(
            err,
            ClientError::Network("Provider 'a' timed out; Error sending request".into())
        );
    }
}
