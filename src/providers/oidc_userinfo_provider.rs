use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::base::{FederatedProvider, Identity, ProviderError};

/// The config for a federated provider that resolves an ID token through
/// an OpenID Connect userinfo endpoint.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct OidcUserInfoProviderConfig {
    pub name: String,
    pub userinfo_uri: String,
}

/// A federated provider bound to the ID token of one third-party login.
pub struct OidcUserInfoProvider {
    pub config: OidcUserInfoProviderConfig,
    id_token: String,
    client: reqwest::Client,
}

impl OidcUserInfoProvider {
    pub fn new(config: &OidcUserInfoProviderConfig, id_token: String) -> Self {
        info!("Creating oidc-userinfo federated provider '{}'", config.name);
        Self {
            config: config.clone(),
            id_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl FederatedProvider for OidcUserInfoProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "oidc-userinfo"
    }

    async fn sign_in(&self) -> Result<Identity, ProviderError> {
        if self.id_token.trim().is_empty() {
            return Err(ProviderError::Rejected(
                "No ID token from the federated login".to_string(),
            ));
        }

        debug!("Resolving federated identity via {}", self.config.userinfo_uri);
        let response = self
            .client
            .get(&self.config.userinfo_uri)
            .bearer_auth(&self.id_token)
            .send()
            .await
            .map_err(|e| ProviderError::Unreachable(format!("Error sending request: {}", e)))?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(ProviderError::Rejected("Invalid ID token".to_string()));
        }
        if status.is_server_error() {
            return Err(ProviderError::Unreachable(format!(
                "Unexpected status code: {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::Rejected(format!(
                "Unexpected status code: {}",
                status
            )));
        }

        let user_info: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Unreachable(format!("Error parsing JSON: {}", e)))?;

        if user_info["email_verified"].as_bool() == Some(false) {
            return Err(ProviderError::Rejected(
                "Federated account email is not verified".to_string(),
            ));
        }

        let email = user_info["email"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Rejected("Federated identity has no email".to_string()))?;

        Ok(Identity {
            email: email.to_string(),
            provider: self.config.name.clone(),
        })
    }
}
