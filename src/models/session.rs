use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// The authenticated user as far as this client is concerned: who they are
/// and the bearer token that proves it to the task API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub bearer_token: String,
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(email: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Session {
            email: email.into(),
            bearer_token: bearer_token.into(),
            authenticated_at: Utc::now(),
        }
    }

    /// Rebuild a session from a stored token.
    ///
    /// The API signs its tokens with a secret we do not have, so the claims are
    /// read without verifying the signature; the server remains the judge of
    /// validity. Malformed and expired tokens are rejected, as are
    /// tokens without an `email` claim.
    pub fn from_token(token: &str) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct Claims {
            email: Option<String>,
        }

        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| format!("Stored token is not usable: {}", e))?;

        match data.claims.email {
            Some(email) if !email.trim().is_empty() => Ok(Session::new(email, token)),
            _ => Err("Stored token carries no email claim".to_string()),
        }
    }
}
