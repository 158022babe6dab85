use anyhow::Context;
use gatehouse_core::GatehouseConfig;
use std::path::Path;

/// Load, overlay the environment and validate. Any failure is fatal at startup.
pub fn load_config(path: &Path) -> anyhow::Result<GatehouseConfig> {
    let cfg = GatehouseConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        clients = cfg.clients.len(),
        privileged_users = cfg.access.privileged_users.len(),
        "Configuration loaded"
    );
    Ok(cfg)
}
