use reqwest::{Method, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::models::{
    MutationResponse, NewTask, Session, Task, TaskId, TaskListResponse, TokenRequest,
    TokenResponse,
};
use crate::utils::http_helpers::{cancellable, read_json, Access};

/// Thin client for the task API.
///
/// Public calls go out bare; secured calls are signed with the bearer token
/// of the `Session` passed in. Every call takes a cancellation token and is
/// bounded by the configured request timeout.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Validation(format!("Invalid api.base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "Invalid api.base_url '{}': not a base URL",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        info!("Task API client for {}", base_url);
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url, session: Option<&Session>) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match session {
            Some(session) => builder.bearer_auth(&session.bearer_token),
            None => builder,
        }
    }

    /// `POST /auth/jwt`: exchanges a verified identity for an API token.
    pub async fn issue_token(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<TokenResponse, ClientError> {
        let url = self.endpoint(&["auth", "jwt"]);
        let request_id = Uuid::new_v4();
        debug!(%request_id, email = request.email.as_str(), "Requesting API token");

        let builder = self.request(Method::POST, url, None).json(request);
        cancellable(cancel, async move {
            let response = builder.send().await?;
            read_json(response, Access::Public).await
        })
        .await
    }

    /// `GET /task?email=<email>`: the session owner's tasks.
    pub async fn list_tasks(
        &self,
        session: &Session,
        cancel: &CancellationToken,
    ) -> Result<Vec<Task>, ClientError> {
        let url = self.endpoint(&["task"]);
        let request_id = Uuid::new_v4();
        debug!(%request_id, email = session.email.as_str(), "Fetching tasks");

        let builder = self
            .request(Method::GET, url, Some(session))
            .query(&[("email", session.email.as_str())]);
        let list: TaskListResponse = cancellable(cancel, async move {
            let response = builder.send().await?;
            read_json(response, Access::Secured).await
        })
        .await?;

        debug!(%request_id, count = list.data.len(), "Fetched tasks");
        Ok(list.data)
    }

    /// `POST /task`.
    pub async fn create_task(
        &self,
        session: &Session,
        task: &NewTask,
        cancel: &CancellationToken,
    ) -> Result<MutationResponse, ClientError> {
        let builder = self
            .request(Method::POST, self.endpoint(&["task"]), Some(session))
            .json(task);
        self.mutate(builder, "create", cancel).await
    }

    /// `PATCH /task/:id` with `task` as the body, sent as given.
    pub async fn update_task(
        &self,
        session: &Session,
        task: &Task,
        cancel: &CancellationToken,
    ) -> Result<MutationResponse, ClientError> {
        let id = task.id.to_string();
        let builder = self
            .request(Method::PATCH, self.endpoint(&["task", &id]), Some(session))
            .json(task);
        self.mutate(builder, "update", cancel).await
    }

    /// `DELETE /task/:id`.
    pub async fn delete_task(
        &self,
        session: &Session,
        id: &TaskId,
        cancel: &CancellationToken,
    ) -> Result<MutationResponse, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::DELETE, self.endpoint(&["task", &id]), Some(session));
        self.mutate(builder, "delete", cancel).await
    }

    async fn mutate(
        &self,
        builder: reqwest::RequestBuilder,
        action: &str,
        cancel: &CancellationToken,
    ) -> Result<MutationResponse, ClientError> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, action, "Sending task mutation");

        let response: MutationResponse = cancellable(cancel, async move {
            let response = builder.send().await?;
            read_json(response, Access::Secured).await
        })
        .await?;

        debug!(%request_id, action, success = response.success, "Task mutation answered");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.url(),
            timeout_in_ms: 2_000,
        })
        .expect("client should build")
    }

    fn session() -> Session {
        Session::new("user@example.com", "T")
    }

    #[test]
    fn endpoint_appends_and_encodes_segments() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            timeout_in_ms: 1_000,
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["task", "a b"]).as_str(),
            "https://api.example.com/v1/task/a%20b"
        );
        assert_eq!(
            client.endpoint(&["auth", "jwt"]).as_str(),
            "https://api.example.com/v1/auth/jwt"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = ApiClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            timeout_in_ms: 1_000,
        })
        .err()
        .expect("invalid base url must fail");
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn issue_token_is_not_signed() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/jwt")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"email": "user@example.com", "role": "user"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "token": "T", "message": "welcome"}"#)
            .create_async()
            .await;

        let res = client_for(&server)
            .issue_token(
                &TokenRequest {
                    email: "user@example.com".to_string(),
                    role: "user".to_string(),
                },
                &CancellationToken::new(),
            )
            .await
            .expect("token call should succeed");
        m.assert_async().await;
        assert!(res.success);
        assert_eq!(res.token.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn list_tasks_is_signed_and_filtered_by_email() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/task")
            .match_query(Matcher::UrlEncoded("email".into(), "user@example.com".into()))
            .match_header("authorization", "Bearer T")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": [{"id": 1, "title": "Write", "description": "docs"}]}"#)
            .create_async()
            .await;

        let tasks = client_for(&server)
            .list_tasks(&session(), &CancellationToken::new())
            .await
            .expect("list should succeed");
        m.assert_async().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Write");
    }

    #[tokio::test]
    async fn unauthorized_secured_call_is_auth_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/task")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "unauthorized access"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tasks(&session(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
    }

    #[tokio::test]
    async fn server_failure_carries_body_message() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/task/9")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "database unavailable"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .delete_task(&session(), &TaskId::Number(9), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Server("database unavailable".to_string()));
    }

    #[tokio::test]
    async fn malformed_body_is_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/task")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .list_tasks(&session(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Server);
    }

    #[tokio::test]
    async fn unreachable_api_is_network_error() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_in_ms: 1_000,
        })
        .unwrap();
        let err = client
            .list_tasks(&session(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Network);
    }

    #[tokio::test]
    async fn cancelled_request_is_not_sent() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/task/1")
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client_for(&server)
            .delete_task(&session(), &TaskId::Number(1), &cancel)
            .await
            .unwrap_err();
        m.assert_async().await;
        assert!(err.is_cancelled());
    }
}
