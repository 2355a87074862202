//! MCP server surface
//!
//! A thin adapter between the rmcp protocol types and the exposure router:
//! `list_tools` reflects the router's advertised set, `call_tool` dispatches
//! and wraps the envelope. Transports (stdio and streamable HTTP) live in
//! [`unified_server`].

pub mod server;
pub mod unified_server;

pub use server::McpServer;
pub use unified_server::{
    run_mcp_server, start_mcp_server, McpServerHandle, McpServerInfo, McpServerMode,
};
