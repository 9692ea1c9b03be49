#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use taskdeck::config::{parse_config, ConfigV1};
use taskdeck::models::Session;
use taskdeck::notify::MemoryNotifier;
use taskdeck::startup::build_state_with_store;
use taskdeck::state::ClientState;
use taskdeck::store::memory_store::MemoryTokenStore;
use taskdeck::tasks::TaskListController;
use tokio::net::TcpListener;

pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "secret1";

/// A client wired to a mock API, with its store and notifier kept for inspection.
pub struct Harness {
    pub state: ClientState,
    pub store: Arc<MemoryTokenStore>,
    pub notifier: Arc<MemoryNotifier>,
}

/// Config pointing at `base_url`, with `extra` appended verbatim.
pub fn config_for(base_url: &str, extra: &str) -> ConfigV1 {
    config_with_timeouts(base_url, 2000, 2000, extra)
}

/// Same as [`config_for`], with explicit API and identity provider timeouts.
pub fn config_with_timeouts(base_url: &str, api_ms: u64, auth_ms: u64, extra: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
  timeout_in_ms: {api_ms}
auth:
  timeout_in_ms: {auth_ms}
storage:
  enabled: false
{extra}
"#
    );
    parse_config(&yaml).expect("test config should parse")
}

pub fn plain_identity() -> String {
    format!(
        r#"
identity:
  providers:
    - type: plain
      name: local
      users:
        - email: "{USER_EMAIL}"
          password: "{USER_PASSWORD}"
"#
    )
}

pub fn harness(config: ConfigV1) -> Harness {
    harness_with_store(config, MemoryTokenStore::new())
}

pub fn harness_with_store(config: ConfigV1, store: MemoryTokenStore) -> Harness {
    let store = Arc::new(store);
    let notifier = Arc::new(MemoryNotifier::new());
    let state = build_state_with_store(Arc::new(config), store.clone(), notifier.clone())
        .expect("state should build");
    Harness {
        state,
        store,
        notifier,
    }
}

/// A token shaped like the ones `/auth/jwt` hands out.
pub fn mint_token(email: &str, expires_in_secs: i64) -> String {
    let claims = json!({
        "email": email,
        "role": "user",
        "exp": Utc::now().timestamp() + expires_in_secs,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .expect("Failed to encode JWT")
}

pub fn controller(harness: &Harness) -> TaskListController {
    TaskListController::new(
        harness.state.api.clone(),
        Session::new(USER_EMAIL, "T"),
        harness.notifier.clone(),
    )
}

/// An address that accepts connections and never answers them.
pub async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}
