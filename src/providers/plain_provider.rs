use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{Identity, IdentityProvider, ProviderError};

/// PlainProviderConfig lists accounts accepted without any remote call.
/// Meant for local development against a test API.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainProviderConfig {
    /// A friendly name for logs.
    pub name: String,
    /// A list of email/password pairs.
    pub users: Vec<PlainUserEntry>,
}

/// Represents a single account entry (email + password).
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct PlainUserEntry {
    pub email: String,
    pub password: String,
}

/// A `PlainProvider` compares credentials to the account list in `PlainProviderConfig`.
pub struct PlainProvider {
    pub config: PlainProviderConfig,
}

impl PlainProvider {
    pub fn new(config: &PlainProviderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for PlainProvider {
    fn get_name(&self) -> &str {
        &self.config.name
    }

    fn get_type(&self) -> &str {
        "plain"
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ProviderError::Rejected("No email given".to_string()));
        }

        debug!("Plain sign-in attempt for '{}'", email);
        let matched = self
            .config
            .users
            .iter()
            .any(|entry| entry.email.eq_ignore_ascii_case(email) && entry.password == password);

        if matched {
            Ok(Identity {
                email: email.to_string(),
                provider: self.config.name.clone(),
            })
        } else {
            Err(ProviderError::Rejected(
                "Wrong email or password".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> PlainProviderConfig {
        PlainProviderConfig {
            name: "TestPlain".to_string(),
            users: vec![
                PlainUserEntry {
                    email: "admin@example.com".to_string(),
                    password: "admin123".to_string(),
                },
                PlainUserEntry {
                    email: "user1@example.com".to_string(),
                    password: "password1".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let provider = PlainProvider::new(&create_test_config());
        let identity = provider
            .sign_in("user1@example.com", "password1")
            .await
            .expect("known account should sign in");
        assert_eq!(identity.email, "user1@example.com");
        assert_eq!(identity.provider, "TestPlain");
    }

    #[tokio::test]
    async fn test_email_is_trimmed_and_case_insensitive() {
        let provider = PlainProvider::new(&create_test_config());
        let identity = provider
            .sign_in("  Admin@Example.com ", "admin123")
            .await
            .expect("email match ignores case and whitespace");
        assert_eq!(identity.email, "Admin@Example.com");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let provider = PlainProvider::new(&create_test_config());
        let result = provider.sign_in("admin@example.com", "wrong").await;
        assert_eq!(
            result.unwrap_err(),
            ProviderError::Rejected("Wrong email or password".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let provider = PlainProvider::new(&create_test_config());
        let err = provider
            .sign_in("nobody@example.com", "admin123")
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_empty_email() {
        let provider = PlainProvider::new(&create_test_config());
        assert!(provider.sign_in("", "admin123").await.is_err());
    }
}
