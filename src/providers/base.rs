use super::{
    oidc_userinfo_provider::{OidcUserInfoProvider, OidcUserInfoProviderConfig},
    password_api_provider::{PasswordApiProvider, PasswordApiProviderConfig},
    plain_provider::{PlainProvider, PlainProviderConfig},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration options for each email/password identity provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "plain")]
    Plain(PlainProviderConfig),
    #[serde(rename = "password-api")]
    PasswordApi(PasswordApiProviderConfig),
}

/// Configuration options for the federated (third-party) identity provider.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(tag = "type")]
pub enum FederatedProviderConfig {
    #[serde(rename = "oidc-userinfo")]
    OidcUserInfo(OidcUserInfoProviderConfig),
}

/// Who the identity provider says the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    /// Name of the provider that vouched for the user.
    pub provider: String,
}

/// Why a provider did not produce an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider answered and turned the user down.
    #[error("{0}")]
    Rejected(String),

    /// The provider could not be asked: connection failure, timeout or a broken reply.
    #[error("{0}")]
    Unreachable(String),
}

impl ProviderError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, ProviderError::Rejected(_))
    }
}

/// An identity provider checks an email/password pair and returns an Identity or an error.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;
}

/// A federated provider resolves an identity from a credential that was
/// obtained outside this client (e.g. an ID token from a third-party login).
#[async_trait::async_trait]
pub trait FederatedProvider: Send + Sync {
    fn get_name(&self) -> &str;
    fn get_type(&self) -> &str;
    async fn sign_in(&self) -> Result<Identity, ProviderError>;
}

/// Create an identity provider from a given config.
pub fn create_identity_provider(config: &ProviderConfig) -> Box<dyn IdentityProvider> {
    match config {
        ProviderConfig::Plain(cfg) => Box::new(PlainProvider::new(cfg)),
        ProviderConfig::PasswordApi(cfg) => Box::new(PasswordApiProvider::new(cfg)),
    }
}

/// Create the federated provider for one sign-in, bound to the external credential.
pub fn create_federated_provider(
    config: &FederatedProviderConfig,
    id_token: String,
) -> Box<dyn FederatedProvider> {
    match config {
        FederatedProviderConfig::OidcUserInfo(cfg) => {
            Box::new(OidcUserInfoProvider::new(cfg, id_token))
        }
    }
}
