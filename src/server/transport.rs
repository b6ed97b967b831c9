//! Transport runtimes: local stdio stream and streamable HTTP.

use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::ServiceExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::RdsMcpServer;
use crate::client::ResourceClient;
use crate::types::{Error, Result};

/// Serve over stdin/stdout until the peer disconnects.
pub async fn serve_stdio<C>(server: RdsMcpServer<C>) -> Result<()>
where
    C: ResourceClient + 'static,
{
    info!("Serving MCP over stdio");
    let service = server
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| Error::transport(e.to_string()))?;
    let reason = service
        .waiting()
        .await
        .map_err(|e| Error::transport(e.to_string()))?;
    info!(?reason, "stdio session ended");
    Ok(())
}

/// Serve streamable HTTP on `/mcp` until Ctrl-C.
pub async fn serve_streamable_http<C>(server: RdsMcpServer<C>, listen_addr: &str) -> Result<()>
where
    C: ResourceClient + 'static,
{
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| Error::transport(format!("failed to bind {listen_addr}: {e}")))?;
    info!(addr = listen_addr, "Serving MCP over streamable HTTP at /mcp");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
        }
        trigger.cancel();
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| Error::transport(e.to_string()))
}
