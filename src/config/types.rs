use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;
use crate::providers::{FederatedProviderConfig, ProviderConfig};

/// Environment variables with this prefix override file values,
/// `__` separating nested keys (e.g. `TASKDECK_API__BASE_URL`).
pub const ENV_PREFIX: &str = "TASKDECK_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: remote API, identity providers, token storage, etc.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ConfigV1 {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load config from a YAML file, with `TASKDECK_*` environment overrides.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    extract(figment)
}

/// Parse config from an in-memory YAML document (no environment overrides).
pub fn parse_config(yaml: &str) -> Result<ConfigV1, figment::Error> {
    extract(Figment::new().merge(Yaml::string(yaml)))
}

fn extract(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Render the JSON schema for the configuration.
pub fn config_schema() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

/// The remote task API.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_api_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_api_timeout_in_ms() -> u64 {
    10_000
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_ms)
    }
}

/// Parameters of the token exchange that follows a successful sign-in.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone)]
pub struct AuthConfig {
    /// Role requested from `/auth/jwt`.
    #[serde(default = "default_role")]
    pub role: String,
    /// Upper bound for each identity provider attempt.
    #[serde(default = "default_auth_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_role() -> String {
    "user".to_string()
}

fn default_auth_timeout_in_ms() -> u64 {
    5_000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            timeout_in_ms: default_auth_timeout_in_ms(),
        }
    }
}

/// Identity providers for password sign-in, plus an optional federated one.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, Default)]
pub struct IdentityConfig {
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    pub federated: Option<FederatedProviderConfig>,
}

#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, Default)]
pub struct TasksConfig {
    /// Re-fetch the list on this interval while watching. Unset or 0 disables polling.
    pub poll_interval_secs: Option<u64>,
}

impl TasksConfig {
    pub fn poll_interval(&self) -> Option<Duration> {
        match self.poll_interval_secs {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0.0"
api:
  base_url: http://localhost:5000
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = parse_config(MINIMAL).expect("minimal config should parse");
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout_in_ms, 10_000);
        assert_eq!(config.auth.role, "user");
        assert!(config.storage.enabled);
        assert!(config.identity.providers.is_empty());
        assert!(config.identity.federated.is_none());
        assert_eq!(config.tasks.poll_interval(), None);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn full_config_parses_providers() {
        let yaml = r#"
version: "1.0.0"
api:
  base_url: https://tasks.example.com
  timeout_in_ms: 2500
auth:
  role: admin
identity:
  providers:
    - type: plain
      name: local
      users:
        - email: a@example.com
          password: secret1
    - type: password-api
      name: identity-toolkit
      uri: https://identity.example.com/v1
      api_key: abc
  federated:
    type: oidc-userinfo
    name: google
    userinfo_uri: https://openidconnect.example.com/v1/userinfo
storage:
  enabled: false
tasks:
  poll_interval_secs: 30
logging:
  level: debug
  format: json
"#;
        let config = parse_config(yaml).expect("full config should parse");
        assert_eq!(config.api.timeout(), Duration::from_millis(2500));
        assert_eq!(config.auth.role, "admin");
        assert_eq!(config.identity.providers.len(), 2);
        assert!(config.identity.federated.is_some());
        assert!(!config.storage.enabled);
        assert_eq!(config.tasks.poll_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn example_config_parses() {
        let config = parse_config(include_str!("../../config.example.yaml"))
            .expect("config.example.yaml should parse");
        assert_eq!(config.identity.providers.len(), 2);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let yaml = r#"
version: "2.0.0"
api:
  base_url: http://localhost:5000
"#;
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn zero_poll_interval_disables_polling() {
        let tasks = TasksConfig {
            poll_interval_secs: Some(0),
        };
        assert_eq!(tasks.poll_interval(), None);
    }

    #[test]
    fn schema_renders() {
        let schema = config_schema().expect("schema should serialize");
        assert!(schema.contains("base_url"));
    }
}
