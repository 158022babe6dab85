//! HTTP transport for MCP.
//!
//! `POST /mcp` carries one JSON-RPC message. The route expects the caller's
//! [`Identity`] as a request extension, inserted by the server's bearer
//! middleware; without it the request is refused.

use crate::dispatcher::ToolDispatcher;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpSession;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use gatehouse_core::{DataAdapter, Identity};
use gatehouse_policy::AccessPolicy;
use std::sync::Arc;

/// Shared state behind the MCP route.
pub struct McpState {
    pub policy: AccessPolicy,
    pub adapter: Arc<dyn DataAdapter>,
    pub server_name: String,
}

impl McpState {
    pub fn new(
        policy: AccessPolicy,
        adapter: Arc<dyn DataAdapter>,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            policy,
            adapter,
            server_name: server_name.into(),
        }
    }

    /// Per-request session: the tool set is derived from the identity each time.
    pub fn session(&self, identity: Identity) -> McpSession {
        let dispatcher = ToolDispatcher::new(identity, &self.policy, self.adapter.clone());
        McpSession::new(dispatcher, self.server_name.clone())
    }
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<McpState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .with_state(state)
}

async fn handle_mcp_post(
    State(state): State<Arc<McpState>>,
    identity: Option<Extension<Identity>>,
    body: Result<Json<JsonRpcRequest>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Some(Extension(identity)) = identity else {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Malformed MCP request");
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(None, -32700, "Parse error")),
            )
                .into_response();
        }
    };

    match state.session(identity).handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
