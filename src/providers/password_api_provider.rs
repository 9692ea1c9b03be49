use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::base::{Identity, IdentityProvider, ProviderError};

/// The config for an identity service exposing a REST password sign-in
/// (`accounts:signInWithPassword`).
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PasswordApiProviderConfig {
    pub name: String,
    pub uri: String,
    pub api_key: String,
}

/// A provider that asks a remote identity service to check the password.
pub struct PasswordApiProvider {
    pub config: PasswordApiProviderConfig,
    client: reqwest::Client,
}

impl PasswordApiProvider {
    pub fn new(config: &PasswordApiProviderConfig) -> Self {
        info!("Creating password-api identity provider '{}'", config.name);
        Self {
            config: config.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for PasswordApiProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "password-api"
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let email = query(&self.client, &self.config, email, password).await?;
        Ok(Identity {
            email,
            provider: self.config.name.clone(),
        })
    }
}

/// Calls the sign-in endpoint, returning the email the service confirmed.
/// A 5xx reply counts as the service being unavailable, any other error
/// status as a rejection.
async fn query(
    client: &reqwest::Client,
    config: &PasswordApiProviderConfig,
    email: &str,
    password: &str,
) -> Result<String, ProviderError> {
    let url = format!(
        "{}/accounts:signInWithPassword",
        config.uri.trim_end_matches('/')
    );

    debug!("Sending password sign-in request for '{}'", email);
    let response = client
        .post(&url)
        .query(&[("key", config.api_key.as_str())])
        .json(&json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        }))
        .send()
        .await
        .map_err(|e| ProviderError::Unreachable(format!("Error sending request: {}", e)))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(ProviderError::Unreachable(format!(
            "Unexpected status code: {}",
            status
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ProviderError::Unreachable(format!("Error parsing JSON: {}", e)))?;

    if status.is_success() {
        Ok(body["email"]
            .as_str()
            .filter(|s| !s.is_empty())
            .unwrap_or(email)
            .to_string())
    } else {
        // {"error": {"code": 400, "message": "INVALID_PASSWORD"}}
        let reason = body["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Unexpected status code: {}", status));
        Err(ProviderError::Rejected(reason))
    }
}
