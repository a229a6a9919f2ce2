//! Shared helpers for HTTP integration tests.
//!
//! Requests are driven through the real router with `tower::ServiceExt::oneshot`;
//! uploaded media lands in a per-test temporary directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use jotter_api::auth::jwt::JwtConfig;
use jotter_api::config::{MediaConfig, ServerConfig};
use jotter_api::router::{build_app_router, App};
use jotter_api::state::AppState;
use jotter_core::storage::FilesystemStorage;
use jotter_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Origin used for absolute media URLs in tests.
pub const TEST_BASE_URL: &str = "http://testserver";

/// Password used by [`TestApp::register`].
pub const TEST_PASSWORD: &str = "s3cret-passw0rd";

const MULTIPART_BOUNDARY: &str = "jotter-test-boundary";

/// Build a test `ServerConfig` storing media under `media_root`.
pub fn test_config(media_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
        log_json: false,
        jwt: JwtConfig {
            secret: "jotter-integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
        media: MediaConfig {
            root: media_root,
            url_prefix: "/media".to_string(),
            public_base_url: Some(TEST_BASE_URL.to_string()),
        },
    }
}

/// The application under test plus the resources it borrows.
pub struct TestApp {
    pub app: App,
    pub pool: PgPool,
    pub config: ServerConfig,
    /// Kept alive for the duration of the test.
    pub media_dir: TempDir,
}

/// Build the full application (same middleware as production) over `pool`.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let media_dir = tempfile::tempdir().expect("create media tempdir");
    let config = test_config(media_dir.path().to_path_buf());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        storage: Arc::new(FilesystemStorage::new(media_dir.path())),
    };

    TestApp {
        app: build_app_router(state, &config),
        pool,
        config,
        media_dir,
    }
}

/// One part of a `multipart/form-data` body.
pub enum FormPart<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            FormPart::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn with_auth(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

impl TestApp {
    /// Send a fully built request.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let request = with_auth(Request::builder().method(Method::GET).uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let request = with_auth(Request::builder().method(Method::DELETE).uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a JSON body with the given method.
    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> Response {
        let request = with_auth(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json"),
            token,
        )
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        self.json(Method::POST, uri, token, body).await
    }

    /// Send a `multipart/form-data` body with the given method.
    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        parts: &[FormPart<'_>],
    ) -> Response {
        let request = with_auth(
            Request::builder().method(method).uri(uri).header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            ),
            token,
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
        self.send(request).await
    }

    /// Register `email` through the API and return the new user's id.
    pub async fn register(&self, email: &str) -> DbId {
        let response = self
            .post_json(
                "/api/auth/users/",
                None,
                json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                    "re_password": TEST_PASSWORD,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }

    /// Log in and return the full login response.
    pub async fn login(&self, email: &str) -> Value {
        let response = self
            .post_json(
                "/api/auth/token/login/",
                None,
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    /// Register and log in, returning `(user_id, access_token)`.
    pub async fn register_and_login(&self, email: &str) -> (DbId, String) {
        let user_id = self.register(email).await;
        let token = self.login(email).await["auth_token"]
            .as_str()
            .unwrap()
            .to_string();
        (user_id, token)
    }
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
