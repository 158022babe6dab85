mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use pretty_assertions::assert_eq;
use serde_json::Value;

async fn approve(app: &TestApp) -> (String, String) {
    let dialog = app.send(get_request(&authorize_uri())).await;
    assert_eq!(dialog.status, StatusCode::OK);

    let approved = app
        .send(post_form("/authorize", &[("state", &hidden_state(&dialog.body))]))
        .await;
    assert_eq!(approved.status, StatusCode::FOUND);

    let set_cookie = approved.header(header::SET_COOKIE).unwrap().to_string();
    let location = approved.header(header::LOCATION).unwrap().to_string();
    (set_cookie, location)
}

#[tokio::test]
async fn full_consent_flow_sets_cookie_and_redirects_upstream() {
    let app = build_test_app().await;

    let dialog = app.send(get_request(&authorize_uri())).await;
    assert_eq!(dialog.status, StatusCode::OK);
    assert!(dialog.header(header::CONTENT_TYPE).unwrap().starts_with("text/html"));
    assert!(dialog.body.contains("<form method=\"post\" action=\"/authorize\">"));
    assert!(dialog.body.contains("Example Agent"));

    let (set_cookie, location) = approve(&app).await;

    assert!(set_cookie.starts_with("mcp-approved-clients="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=31536000"));

    assert!(location.starts_with(&format!("{}/login/oauth/authorize?", app.upstream_base)));
    assert_eq!(query_param(&location, "client_id").as_deref(), Some(UPSTREAM_CLIENT_ID));
    assert_eq!(query_param(&location, "response_type").as_deref(), Some("code"));
    assert_eq!(
        query_param(&location, "redirect_uri").as_deref(),
        Some("http://localhost:8788/callback")
    );

    let carried = STANDARD.decode(query_param(&location, "state").unwrap()).unwrap();
    let carried: Value = serde_json::from_slice(&carried).unwrap();
    assert_eq!(carried["clientId"], CLIENT_ID);
    assert_eq!(carried["redirectUri"], REDIRECT_URI);
    assert_eq!(carried["scope"], serde_json::json!(["db"]));
    assert_eq!(carried["state"], "rp-state");
}

#[tokio::test]
async fn approved_client_skips_dialog() {
    let app = build_test_app().await;
    let (set_cookie, _) = approve(&app).await;

    let cookie = format!("theme=dark; {}", request_cookie(&set_cookie));
    let response = app.send(get_with_cookie(&authorize_uri(), &cookie)).await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert!(response.header(header::SET_COOKIE).is_none());
    assert!(response
        .header(header::LOCATION)
        .unwrap()
        .contains("/login/oauth/authorize?"));
}

#[tokio::test]
async fn tampered_or_malformed_cookie_shows_dialog() {
    let app = build_test_app().await;
    let (set_cookie, _) = approve(&app).await;
    let cookie = request_cookie(&set_cookie);

    let (name_and_sig, payload) = cookie.split_once('.').unwrap();
    let last = name_and_sig.chars().last().unwrap();
    let flipped = if last == 'a' { 'b' } else { 'a' };
    let tampered = format!(
        "{}{}.{}",
        &name_and_sig[..name_and_sig.len() - 1],
        flipped,
        payload
    );

    for cookie in [
        tampered,
        "mcp-approved-clients=garbage".to_string(),
        "mcp-approved-clients=a.b.c".to_string(),
    ] {
        let response = app.send(get_with_cookie(&authorize_uri(), &cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{cookie}");
        assert!(response.body.contains("name=\"state\""));
    }
}

#[tokio::test]
async fn authorize_rejects_bad_requests() {
    let app = build_test_app().await;

    let missing = app.send(get_request("/authorize?response_type=code")).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body, "Invalid request");

    let unknown = app.send(get_request("/authorize?client_id=nope")).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let open_redirect = app
        .send(get_request(
            "/authorize?client_id=abc&redirect_uri=https%3A%2F%2Fattacker.example%2Fcb",
        ))
        .await;
    assert_eq!(open_redirect.status, StatusCode::BAD_REQUEST);

    let no_state = app.send(post_form("/authorize", &[])).await;
    assert_eq!(no_state.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_state.body, "Invalid request");

    let garbage_state = app.send(post_form("/authorize", &[("state", "%%%")])).await;
    assert_eq!(garbage_state.status, StatusCode::BAD_REQUEST);

    let wrong_method = app
        .send(
            Request::builder()
                .method("PUT")
                .uri("/authorize")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn callback_error_statuses() {
    let app = build_test_app().await;
    let (_, location) = approve(&app).await;
    let state = query_param(&location, "state").unwrap();
    let encoded_state = url::form_urlencoded::byte_serialize(state.as_bytes()).collect::<String>();

    let no_state = app.send(get_request("/callback?code=good-code")).await;
    assert_eq!(no_state.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_state.body, "Invalid state");

    let no_client = STANDARD.encode(r#"{"clientId":"","redirectUri":"https://example.com/cb"}"#);
    let no_client = url::form_urlencoded::byte_serialize(no_client.as_bytes()).collect::<String>();
    let response = app
        .send(get_request(&format!("/callback?code=good-code&state={no_client}")))
        .await;
    assert_eq!(response.body, "Invalid state");

    let no_code = app.send(get_request(&format!("/callback?state={encoded_state}"))).await;
    assert_eq!(no_code.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_code.body, "Missing code");

    let rejected = app
        .send(get_request(&format!("/callback?code={REJECTED_CODE}&state={encoded_state}")))
        .await;
    assert_eq!(rejected.status, StatusCode::INTERNAL_SERVER_ERROR);

    let no_token = app
        .send(get_request(&format!("/callback?code=unknown&state={encoded_state}")))
        .await;
    assert_eq!(no_token.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn callback_redirects_to_relying_party_and_code_buys_one_token() {
    let app = build_test_app().await;
    let (_, location) = approve(&app).await;
    let state = query_param(&location, "state").unwrap();
    let encoded_state = url::form_urlencoded::byte_serialize(state.as_bytes()).collect::<String>();

    let callback = app
        .send(get_request(&format!("/callback?code={GOOD_CODE}&state={encoded_state}")))
        .await;
    assert_eq!(callback.status, StatusCode::FOUND);

    let rp_location = callback.header(header::LOCATION).unwrap().to_string();
    assert!(rp_location.starts_with("https://example.com/cb?"));
    assert_eq!(query_param(&rp_location, "state").as_deref(), Some("rp-state"));
    let code = query_param(&rp_location, "code").unwrap();

    let exchange = [
        ("grant_type", "authorization_code"),
        ("code", code.as_str()),
        ("client_id", CLIENT_ID),
        ("redirect_uri", REDIRECT_URI),
    ];
    let token = app.send(post_form("/token", &exchange)).await;
    assert_eq!(token.status, StatusCode::OK);
    let body = token.json();
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["scope"], "db");
    assert_eq!(body["expires_in"], 3600);
    let bearer = body["access_token"].as_str().unwrap().to_string();

    let identity = app.state.grants.resolve_token(&bearer).await.unwrap();
    assert_eq!(identity.login, "octocat");
    assert_eq!(identity.name, "octocat");
    assert_eq!(identity.email.as_deref(), Some("octocat@example.com"));

    let replay = app.send(post_form("/token", &exchange)).await;
    assert_eq!(replay.status, StatusCode::BAD_REQUEST);
    assert_eq!(replay.json()["error"], "invalid_grant");
}

#[tokio::test]
async fn token_endpoint_rejects_other_grants() {
    let app = build_test_app().await;

    let refresh = app
        .send(post_form("/token", &[("grant_type", "refresh_token"), ("refresh_token", "x")]))
        .await;
    assert_eq!(refresh.status, StatusCode::BAD_REQUEST);
    assert_eq!(refresh.json()["error"], "unsupported_grant_type");

    let unknown = app
        .send(post_form(
            "/token",
            &[
                ("grant_type", "authorization_code"),
                ("code", "never-issued"),
                ("client_id", CLIENT_ID),
                ("redirect_uri", REDIRECT_URI),
            ],
        ))
        .await;
    assert_eq!(unknown.json()["error"], "invalid_grant");
}

#[tokio::test]
async fn healthz() {
    let app = build_test_app().await;
    let response = app.send(get_request("/healthz")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), serde_json::json!({"ok": true, "service": "gatehouse"}));
}
