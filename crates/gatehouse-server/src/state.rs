use crate::auth::{
    clients::ClientRegistry, grants::GrantStore, signing::CookieSigner, upstream::UpstreamClient,
};
use gatehouse_core::{DataAdapter, GatehouseConfig};
use gatehouse_mcp::McpState;
use gatehouse_policy::AccessPolicy;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub cfg: GatehouseConfig,
    pub signer: CookieSigner,
    pub clients: ClientRegistry,
    pub upstream: UpstreamClient,
    pub grants: GrantStore,
    /// Policy, adapter and server name behind `/mcp`.
    pub mcp: Arc<McpState>,
}

impl AppState {
    /// Fails when the cookie secret is missing or the HTTP client cannot be built.
    pub fn new(cfg: GatehouseConfig, adapter: Arc<dyn DataAdapter>) -> anyhow::Result<Self> {
        let signer = CookieSigner::new(&cfg.cookie.secret)?;
        let upstream = UpstreamClient::new(cfg.upstream.clone(), cfg.server.callback_url())?;
        let mcp = Arc::new(McpState::new(
            AccessPolicy::from_config(&cfg.access),
            adapter,
            cfg.server.server_name.clone(),
        ));

        Ok(Self {
            signer,
            upstream,
            clients: ClientRegistry::new(cfg.clients.iter().cloned()),
            grants: GrantStore::new(&cfg.grants),
            mcp,
            cfg,
        })
    }
}
