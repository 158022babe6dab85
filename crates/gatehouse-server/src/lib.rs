//! # gatehouse-server
//!
//! HTTP surface of Gatehouse:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET/POST /authorize` | Approval cookie check, consent dialog, redirect upstream |
//! | `GET /callback` | Upstream code exchange, identity fetch, grant code for the relying party |
//! | `POST /token` | Grant code to bearer token |
//! | `POST /mcp` | JSON-RPC tools, bearer token required |
//! | `GET /healthz` | Liveness |

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::json;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    let mcp = gatehouse_mcp::create_router(state.mcp.clone()).route_layer(from_fn_with_state(
        state.clone(),
        middleware::auth::require_bearer,
    ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(auth::flow::router())
        .with_state(state)
        .merge(mcp)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "gatehouse" }))
}
