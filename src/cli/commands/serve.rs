use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use portal_core::approvals::PortalClient;
use portal_core::config::load_config;
use portal_core::server::{create_router, AppState};

/// Start the local API server, deciding requests through the configured backend
pub async fn run(port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let port = port.unwrap_or(config.server.port);
    let executor = Arc::new(PortalClient::new(&config.api)?);
    let backend = config.api.base_url.clone();

    let state = Arc::new(AppState::new(config, executor));
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(%addr, backend = %backend, "api server listening");
    eprintln!("[portal] Serving API on http://{}", addr);
    eprintln!("[portal] Decisions are forwarded to {}", backend);

    axum::serve(listener, app).await?;
    Ok(())
}
