//! Transport plumbing for the MCP server
//!
//! One entry point serves both transports: stdio for editor-style clients
//! and streamable HTTP (with a plain /health route) for networked ones. The
//! exposure mode is fixed before the transport starts and never changes for
//! the life of the process.

use cloudgate_common::{CloudGateError, Result};
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::server::McpServer;

async fn health_check() -> axum::response::Json<serde_json::Value> {
    axum::response::Json(serde_json::json!({
        "status": "healthy",
        "service": "cloudgate-mcp"
    }))
}

/// MCP server transport mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum McpServerMode {
    /// Standard input/output transport
    Stdio,
    /// HTTP transport; `None` picks a random port
    Http { port: Option<u16> },
}

/// Connection information returned after server startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerInfo {
    /// The transport mode used
    pub mode: McpServerMode,
    /// Connection URL or identifier
    pub connection_url: String,
    /// Actual bound port (for HTTP mode)
    pub port: Option<u16>,
}

/// Handle for a server started in the background
#[derive(Debug)]
pub struct McpServerHandle {
    info: McpServerInfo,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl McpServerHandle {
    fn new(info: McpServerInfo, shutdown_tx: oneshot::Sender<()>) -> Self {
        Self {
            info,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Connection information
    pub fn info(&self) -> &McpServerInfo {
        &self.info
    }

    /// Actual bound port (HTTP mode)
    pub fn port(&self) -> Option<u16> {
        self.info.port
    }

    /// Connection URL
    pub fn url(&self) -> &str {
        &self.info.connection_url
    }

    /// Signal shutdown; safe to call more than once
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                tracing::warn!("server shutdown receiver already dropped");
            }
        }
        Ok(())
    }
}

/// Run the server on the given transport until the client disconnects or the
/// listener fails.
///
/// This is what the `serve` subcommand calls; it blocks for the life of the
/// server.
pub async fn run_mcp_server(mode: McpServerMode, server: McpServer) -> Result<()> {
    match mode {
        McpServerMode::Stdio => {
            tracing::info!("starting MCP server on stdio");
            let running = serve_server(server, stdio())
                .await
                .map_err(|e| CloudGateError::other(format!("failed to start stdio server: {e}")))?;
            let quit_reason = running
                .waiting()
                .await
                .map_err(|e| CloudGateError::other(format!("stdio server task failed: {e}")))?;
            tracing::info!(?quit_reason, "MCP stdio server completed");
            Ok(())
        }
        McpServerMode::Http { port } => {
            let (listener, url) = bind_http(port).await?;
            tracing::info!(%url, "starting MCP server on HTTP");
            let router = http_router(server);
            axum::serve(listener, router)
                .await
                .map_err(|e| CloudGateError::other(format!("HTTP server failed: {e}")))
        }
    }
}

/// Start the server in the background and return a handle with connection
/// information. Used by embedding code and tests.
pub async fn start_mcp_server(mode: McpServerMode, server: McpServer) -> Result<McpServerHandle> {
    match mode {
        McpServerMode::Stdio => {
            let (shutdown_tx, _shutdown_rx) = oneshot::channel();
            tokio::spawn(async move {
                if let Err(e) = run_mcp_server(McpServerMode::Stdio, server).await {
                    tracing::error!("stdio server error: {}", e);
                }
            });
            Ok(McpServerHandle::new(
                McpServerInfo {
                    mode: McpServerMode::Stdio,
                    connection_url: "stdio".to_string(),
                    port: None,
                },
                shutdown_tx,
            ))
        }
        McpServerMode::Http { port } => {
            let (listener, connection_url) = bind_http(port).await?;
            let actual_port = listener
                .local_addr()
                .map_err(|e| CloudGateError::other(format!("failed to get local address: {e}")))?
                .port();
            let router = http_router(server);

            let (shutdown_tx, shutdown_rx) = oneshot::channel();
            tokio::spawn(async move {
                let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                });
                if let Err(e) = serve.await {
                    tracing::error!("HTTP server error: {}", e);
                }
            });

            tracing::info!(%connection_url, "MCP HTTP server ready");
            Ok(McpServerHandle::new(
                McpServerInfo {
                    mode: McpServerMode::Http {
                        port: Some(actual_port),
                    },
                    connection_url,
                    port: Some(actual_port),
                },
                shutdown_tx,
            ))
        }
    }
}

async fn bind_http(port: Option<u16>) -> Result<(TcpListener, String)> {
    let bind_addr = format!("127.0.0.1:{}", port.unwrap_or(0));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| CloudGateError::other(format!("failed to bind to {bind_addr}: {e}")))?;
    let actual_port = listener
        .local_addr()
        .map_err(|e| CloudGateError::other(format!("failed to get local address: {e}")))?
        .port();
    Ok((listener, format!("http://127.0.0.1:{actual_port}/mcp")))
}

fn http_router(server: McpServer) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    axum::Router::new()
        .nest_service("/mcp", service)
        .route("/health", axum::routing::get(health_check))
}
