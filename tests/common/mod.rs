#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

use pamps::app::users::UserService;
use pamps::infra::memory::MemoryStore;
use pamps::infra::store::Store;
use pamps::AppState;

// "0123456789abcdef0123456789abcdef" and its reverse, test-only keys.
const TEST_PASETO_ACCESS_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";
const TEST_PASETO_REFRESH_KEY: [u8; 32] = *b"fedcba9876543210fedcba9876543210";

// ---------------------------------------------------------------------------
// TestApp: the served router over a fresh store, one per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    service: NormalizePath<Router>,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn detail(&self) -> String {
        self.json()["detail"].as_str().unwrap_or("").to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.body_bytes.is_empty()
    }
}

pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn app() -> TestApp {
    TestApp::setup()
}

impl TestApp {
    fn setup() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let state = AppState {
            store,
            paseto_access_key: TEST_PASETO_ACCESS_KEY,
            paseto_refresh_key: TEST_PASETO_REFRESH_KEY,
            access_ttl_minutes: 15,
            refresh_ttl_days: 30,
        };
        let service = pamps::http::service(pamps::http::router(state.clone()));

        TestApp { service, state }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<(&str, String)>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = match body {
            Some((content_type, body)) => builder
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .service
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::GET, path, None, &headers).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::POST, path, None, &headers).await
    }

    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        let body = serde_json::to_string(&body).unwrap();
        self.request(Method::POST, path, Some(("application/json", body)), &headers)
            .await
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        self.request(
            Method::POST,
            path,
            Some(("application/x-www-form-urlencoded", body)),
            &[],
        )
        .await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        let auth = token.map(|t| format!("Bearer {}", t));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        self.request(Method::DELETE, path, None, &headers).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Create a user whose password equals its username, and issue tokens
    /// for it directly through the auth service.
    pub async fn create_user(&self, username: &str) -> TestUser {
        let service = UserService::new(self.state.store.clone());
        let user = service
            .create_user(
                format!("{}@pamps.com", username),
                username.to_string(),
                username,
                None,
                None,
            )
            .await
            .expect("create user failed");

        let tokens = self
            .state
            .auth_service()
            .issue_token_pair(user.id)
            .await
            .expect("issue_token_pair failed");

        TestUser {
            id: user.id,
            username: user.username,
            password: username.to_string(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }

    /// Create a post through the API and return its id.
    pub async fn create_post(&self, user: &TestUser, text: &str, parent_id: Option<i64>) -> i64 {
        let resp = self
            .post_json(
                "/post",
                serde_json::json!({ "text": text, "parent_id": parent_id }),
                Some(&user.access_token),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
        resp.json()["id"].as_i64().expect("post id")
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.state.store
    }

    /// Number of follow edges `(from_id, to_id)`.
    pub async fn follow_count(&self, from_id: i64, to_id: i64) -> usize {
        self.store()
            .list_following(from_id)
            .await
            .expect("list_following failed")
            .iter()
            .filter(|edge| edge.to_id == to_id)
            .count()
    }
}
