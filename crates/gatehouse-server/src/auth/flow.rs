//! Authorization-request flow.
//!
//! ```text
//! GET  /authorize ──(cookie approves client)──────────────┐
//!        │ otherwise: approval dialog                      │
//!        ▼                                                 ▼
//! POST /authorize ── record approval (Set-Cookie) ──► 302 upstream authorize
//!                                                          │
//! GET  /callback ◄─────────────────────────────────────────┘
//!        │ exchange code, fetch identity, mint grant code
//!        ▼
//!      302 relying party redirect_uri?code=..&state=..
//!
//! POST /token    code ─► bearer token for /mcp
//! ```

use super::{
    approval::{cookie_header, is_client_approved, record_approval},
    dialog::render_approval_dialog,
    request::{decode_state, encode_state, parse_authorization_request, AuthorizeQuery},
};
use crate::{error::AppError, state::AppState};
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gatehouse_core::AuthorizationRequest;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use url::Url;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/authorize",
            get(authorize_get)
                .post(authorize_post)
                .fallback(method_not_allowed),
        )
        .route("/callback", get(callback))
        .route("/token", post(token))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn authorize_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<AuthorizeQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|_| AppError::InvalidRequest)?;
    let (request, client) = parse_authorization_request(query, &state.clients)?;
    let encoded = encode_state(&request);

    let cookies = cookie_header(&headers);
    if is_client_approved(cookies.as_deref(), &request.client_id, &state.signer) {
        tracing::info!(client_id = %request.client_id, "Client already approved");
        return redirect_upstream(&state, &encoded, None);
    }

    tracing::info!(client_id = %request.client_id, "Showing approval dialog");
    Ok(Html(render_approval_dialog(&state.cfg.server, client, &encoded)).into_response())
}

#[derive(Debug, Deserialize)]
struct ApprovalForm {
    state: Option<String>,
}

async fn authorize_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<ApprovalForm>, FormRejection>,
) -> Result<Response, AppError> {
    let encoded = form
        .ok()
        .and_then(|Form(form)| form.state)
        .ok_or(AppError::InvalidRequest)?;
    let request = decode_state(&encoded).ok_or(AppError::InvalidRequest)?;
    if state
        .clients
        .authorize(&request.client_id, &request.redirect_uri)
        .is_none()
    {
        return Err(AppError::InvalidRequest);
    }

    let cookies = cookie_header(&headers);
    let set_cookie = record_approval(cookies.as_deref(), &request.client_id, &state.signer);
    tracing::info!(client_id = %request.client_id, "Client approved");

    redirect_upstream(&state, &encode_state(&request), Some(set_cookie))
}

fn redirect_upstream(
    state: &AppState,
    encoded_state: &str,
    set_cookie: Option<String>,
) -> Result<Response, AppError> {
    let location = state
        .upstream
        .authorize_url(encoded_state)
        .map_err(AppError::internal)?;

    let mut response = found(location);
    if let Some(cookie) = set_cookie {
        let value: HeaderValue = cookie.parse().map_err(AppError::internal)?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

async fn callback(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|_| AppError::InvalidState)?;
    let request = query
        .state
        .as_deref()
        .and_then(decode_state)
        .ok_or(AppError::InvalidState)?;
    if state
        .clients
        .authorize(&request.client_id, &request.redirect_uri)
        .is_none()
    {
        tracing::warn!(client_id = %request.client_id, "Callback for unregistered client or redirect");
        return Err(AppError::InvalidState);
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AppError::MissingCode)?;

    let access_token = state.upstream.exchange_code(&code).await?;
    let identity = state.upstream.fetch_identity(&access_token).await?;
    tracing::info!(
        client_id = %request.client_id,
        login = %identity.login,
        "Upstream login completed"
    );

    let grant_code = state.grants.issue_code(request.clone(), identity).await;
    Ok(found(relying_party_redirect(&request, &grant_code)?))
}

fn relying_party_redirect(request: &AuthorizationRequest, code: &str) -> Result<String, AppError> {
    let mut url = Url::parse(&request.redirect_uri).map_err(|_| AppError::InvalidState)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("code", code);
        if let Some(rp_state) = &request.state {
            pairs.append_pair("state", rp_state);
        }
    }
    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct TokenForm {
    grant_type: Option<String>,
    code: Option<String>,
    client_id: Option<String>,
    redirect_uri: Option<String>,
}

async fn token(
    State(state): State<Arc<AppState>>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Ok(Form(form)) = form else {
        return Err(AppError::OAuth {
            error: "invalid_request",
            description: "expected a form-encoded body".to_string(),
        });
    };
    if form.grant_type.as_deref() != Some("authorization_code") {
        return Err(AppError::OAuth {
            error: "unsupported_grant_type",
            description: "only authorization_code is supported".to_string(),
        });
    }
    let (Some(code), Some(client_id), Some(redirect_uri)) =
        (form.code, form.client_id, form.redirect_uri)
    else {
        return Err(AppError::OAuth {
            error: "invalid_request",
            description: "code, client_id and redirect_uri are required".to_string(),
        });
    };

    let issued = state
        .grants
        .exchange_code(&code, &client_id, &redirect_uri)
        .await
        .map_err(|e| {
            tracing::info!(client_id = %client_id, error = %e, "Code exchange rejected");
            AppError::invalid_grant(e)
        })?;

    tracing::info!(client_id = %client_id, "Bearer token issued");
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(json!({
            "access_token": issued.access_token,
            "token_type": "bearer",
            "expires_in": issued.expires_in,
            "scope": issued.scope,
        })),
    )
        .into_response())
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
