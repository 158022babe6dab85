#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::Form,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gatehouse_core::{
    config::GrantConfig, AuthorizationRequest, ColumnInfo, DataAdapter, ExecuteOutcome,
    GatehouseConfig, Identity, RegisteredClient, TableInfo,
};
use gatehouse_server::{router, state::AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const CLIENT_ID: &str = "abc";
pub const REDIRECT_URI: &str = "https://example.com/cb";
pub const UPSTREAM_CLIENT_ID: &str = "gh-client";
pub const GOOD_CODE: &str = "good-code";
pub const REJECTED_CODE: &str = "rejected-code";
pub const UPSTREAM_TOKEN: &str = "gho_test_token";

/// Data adapter double that records every statement reaching it.
#[derive(Default)]
pub struct FakeAdapter {
    statements: Mutex<Vec<String>>,
}

impl FakeAdapter {
    pub fn seen(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataAdapter for FakeAdapter {
    async fn list_tables(&self) -> anyhow::Result<Vec<TableInfo>> {
        Ok(vec![TableInfo {
            name: "orders".to_string(),
            schema: "public".to_string(),
            columns: vec![ColumnInfo {
                name: "id".to_string(),
                data_type: "bigint".to_string(),
                nullable: false,
                default: None,
            }],
        }])
    }

    async fn query(&self, sql: &str) -> anyhow::Result<Vec<Value>> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(vec![json!({"id": 1})])
    }

    async fn execute(&self, sql: &str) -> anyhow::Result<ExecuteOutcome> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(ExecuteOutcome::Affected(1))
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    pub adapter: Arc<FakeAdapter>,
    pub upstream_base: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response: Response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request should execute");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("response body should be readable");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }

    /// Mint a bearer token for `login` without going through the browser flow.
    pub async fn bearer_for(&self, login: &str) -> String {
        let request = AuthorizationRequest {
            client_id: CLIENT_ID.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            ..Default::default()
        };
        let identity = Identity {
            login: login.to_string(),
            name: login.to_string(),
            email: None,
            access_token: UPSTREAM_TOKEN.to_string(),
        };
        let code = self.state.grants.issue_code(request, identity).await;
        self.state
            .grants
            .exchange_code(&code, CLIENT_ID, REDIRECT_URI)
            .await
            .expect("fresh code should exchange")
            .access_token
    }
}

pub fn test_config(upstream_base: &str) -> GatehouseConfig {
    let mut cfg = GatehouseConfig::default();
    cfg.server.base_url = "http://localhost:8788".to_string();
    cfg.upstream.client_id = UPSTREAM_CLIENT_ID.to_string();
    cfg.upstream.client_secret = "gh-secret".to_string();
    cfg.upstream.authorize_url = format!("{upstream_base}/login/oauth/authorize");
    cfg.upstream.token_url = format!("{upstream_base}/login/oauth/access_token");
    cfg.upstream.user_url = format!("{upstream_base}/user");
    cfg.cookie.secret = "integration-cookie-secret".to_string();
    cfg.database.url = "postgres://unused".to_string();
    cfg.access.privileged_users = vec!["octocat".to_string()];
    cfg.grants = GrantConfig::default();
    cfg.clients = vec![RegisteredClient {
        client_id: CLIENT_ID.to_string(),
        client_name: Some("Example Agent".to_string()),
        client_uri: Some("https://example.com".to_string()),
        redirect_uris: vec![REDIRECT_URI.to_string()],
        contacts: vec!["ops@example.com".to_string()],
        ..Default::default()
    }];
    cfg
}

pub async fn build_test_app() -> TestApp {
    let upstream_base = spawn_upstream().await;
    let adapter = Arc::new(FakeAdapter::default());
    let state = Arc::new(
        AppState::new(test_config(&upstream_base), adapter.clone())
            .expect("state should build"),
    );

    TestApp {
        app: router(state.clone()),
        state,
        adapter,
        upstream_base,
    }
}

/// Throwaway GitHub-style identity provider.
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/login/oauth/access_token", post(upstream_token))
        .route("/user", get(upstream_user));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("mock upstream should bind");
    let addr = listener.local_addr().expect("mock upstream address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn upstream_token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("client_id").map(String::as_str) != Some(UPSTREAM_CLIENT_ID) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match form.get("code").map(String::as_str) {
        Some(GOOD_CODE) => (
            [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
            format!("access_token={UPSTREAM_TOKEN}&scope=read%3Auser&token_type=bearer"),
        )
            .into_response(),
        Some(REJECTED_CODE) => StatusCode::BAD_GATEWAY.into_response(),
        _ => (
            [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
            "error=bad_verification_code&error_description=The+code+is+incorrect".to_string(),
        )
            .into_response(),
    }
}

async fn upstream_user(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {UPSTREAM_TOKEN}");
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "login": "octocat", "name": null, "email": "octocat@example.com" })).into_response()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn post_mcp(bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// `/authorize` query for the registered test client.
pub fn authorize_uri() -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("client_id", CLIENT_ID)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("scope", "db")
        .append_pair("state", "rp-state")
        .finish();
    format!("/authorize?{query}")
}

/// Value of the hidden `state` input in the approval dialog.
pub fn hidden_state(html: &str) -> String {
    let marker = r#"name="state" value=""#;
    let start = html.find(marker).expect("dialog should carry state") + marker.len();
    let end = html[start..].find('"').expect("state attribute should close") + start;
    html[start..end].to_string()
}

/// `Set-Cookie` value reduced to the `name=value` a browser sends back.
pub fn request_cookie(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

pub fn query_param(location: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(location).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
