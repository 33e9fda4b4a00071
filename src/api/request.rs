//! Authenticated request dispatch

use log::debug;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// A fully read API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text (lossy for invalid UTF-8)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ClientError::Serialization(format!(
                "Failed to decode response from {}: {}",
                self.url, e
            ))
        })
    }
}

impl ApiClient {
    /// Send an authenticated request to `base_url + path`.
    ///
    /// The path is appended verbatim and must start with `/`. Status codes
    /// >= 400 come back as `ClientError::RequestFailed` holding the response.
    pub async fn do_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let token = self.bearer_token().await?;

        let payload = match body {
            Some(b) => Some(serde_json::to_vec(b).map_err(|e| {
                ClientError::Serialization(format!("Failed to encode request body: {}", e))
            })?),
            None => None,
        };

        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json");
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!("{} {} -> {}", method, url, status);

        let response = ApiResponse { status, url, body };
        if status >= 400 {
            return Err(ClientError::RequestFailed { status, response });
        }
        Ok(response)
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.do_request::<()>(Method::GET, path, None).await?.json()
    }

    /// Send `body` as JSON and decode the JSON response
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.do_request(method, path, Some(body)).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::token_expiring_at;
    use crate::auth::{Clock, CredentialStrategy, ManualClock};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Deserialize, Debug)]
    struct Project {
        id: String,
        name: String,
    }

    fn token_requests(requests: &[wiremock::Request]) -> usize {
        requests
            .iter()
            .filter(|r| r.url.path() == "/oauth/token")
            .count()
    }

    fn fresh_token() -> String {
        token_expiring_at(chrono::Utc::now().timestamp() + 3600)
    }

    #[tokio::test]
    async fn test_do_request_sets_headers() {
        let server = MockServer::start().await;
        let token = fresh_token();

        Mock::given(method("GET"))
            .and(path("/api/projects/v1"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "p-1", "name": "alpha" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::test_client(&server.uri(), CredentialStrategy::token(&token));
        let projects: Vec<Project> = client.get_json("/api/projects/v1").await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p-1");
        assert_eq!(projects[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_do_request_sends_json_body() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "name": "staging", "tenantType": 0 });

        Mock::given(method("POST"))
            .and(path("/api/projects/v2/p-1/environments"))
            .and(body_json(&body))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({ "id": "env-1", "name": "staging" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            ApiClient::test_client(&server.uri(), CredentialStrategy::token(&fresh_token()));
        let created: serde_json::Value = client
            .send_json(Method::POST, "/api/projects/v2/p-1/environments", &body)
            .await
            .unwrap();
        assert_eq!(created["id"], "env-1");
    }

    #[tokio::test]
    async fn test_do_request_404_returns_response_in_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/clients/v1/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"title":"Not Found"}"#))
            .mount(&server)
            .await;

        let client =
            ApiClient::test_client(&server.uri(), CredentialStrategy::token(&fresh_token()));
        let err = client
            .do_request::<()>(Method::DELETE, "/api/clients/v1/missing", None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        let response = err.into_response().expect("response kept on failure");
        assert_eq!(response.status, 404);
        assert!(response.text().contains("Not Found"));
        assert!(response.url.ends_with("/api/clients/v1/missing"));
    }

    #[tokio::test]
    async fn test_do_request_unencodable_body_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client =
            ApiClient::test_client(&server.uri(), CredentialStrategy::token(&fresh_token()));

        // Non-string map keys cannot be encoded as JSON
        let mut body: HashMap<(u8, u8), u8> = HashMap::new();
        body.insert((1, 2), 3);

        let err = client
            .do_request(Method::POST, "/api/anything", Some(&body))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_do_request_auth_failure_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/projects/v1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ApiClient::test_client(
            &server.uri(),
            CredentialStrategy::client_credentials("id", "secret"),
        );
        let err = client
            .do_request::<()>(Method::GET, "/api/projects/v1", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Authentication {
                status: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_do_request_transport_error() {
        // Nothing listens on port 9 (discard) on test machines
        let client = ApiClient::test_client(
            "http://127.0.0.1:9",
            CredentialStrategy::token(&fresh_token()),
        );
        let err = client
            .do_request::<()>(Method::GET, "/api/projects/v1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_get_json_decode_failure_is_serialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects/v1/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client =
            ApiClient::test_client(&server.uri(), CredentialStrategy::token(&fresh_token()));
        let result: Result<Project> = client.get_json("/api/projects/v1/p-1").await;
        match result {
            Err(ClientError::Serialization(msg)) => assert!(msg.contains("/api/projects/v1/p-1")),
            other => panic!("Expected ClientError::Serialization, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_path_is_appended_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/environments/v1"))
            .and(query_param("projectId", "p-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            ApiClient::test_client(&server.uri(), CredentialStrategy::token(&fresh_token()));
        let response = client
            .do_request::<()>(Method::GET, "/api/environments/v1?projectId=p-1", None)
            .await
            .unwrap();
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_happens_before_request_after_56_minutes() {
        let server = MockServer::start().await;
        let clock = Arc::new(ManualClock::starting_now());
        let token = token_expiring_at(clock.now() + 3600);

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/projects/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(3)
            .mount(&server)
            .await;

        let client = ApiClient::test_client(
            &server.uri(),
            CredentialStrategy::client_credentials("id", "secret"),
        )
        .with_clock(clock.clone());

        client
            .do_request::<()>(Method::GET, "/api/projects/v1", None)
            .await
            .unwrap();
        client
            .do_request::<()>(Method::GET, "/api/projects/v1", None)
            .await
            .unwrap();

        assert_eq!(token_requests(&server.received_requests().await.unwrap()), 1);

        clock.advance(Duration::from_secs(56 * 60));
        client
            .do_request::<()>(Method::GET, "/api/projects/v1", None)
            .await
            .unwrap();
        assert_eq!(token_requests(&server.received_requests().await.unwrap()), 2);
    }

    #[test]
    fn test_api_response_helpers() {
        let response = ApiResponse {
            status: 201,
            url: "https://example.com/x".to_string(),
            body: br#"{"id":"a"}"#.to_vec(),
        };
        assert!(response.is_success());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(response.text(), r#"{"id":"a"}"#);
    }
}
