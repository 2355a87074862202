//! rmcp server handler over the exposure router

use std::sync::Arc;

use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};

use crate::engine::context::ToolContext;
use crate::engine::exposure::{ExposureRouter, ToolDescriptor};

/// Server instructions displayed to MCP clients
const SERVER_INSTRUCTIONS: &str =
    "Cloud resource operations behind one façade. Every tool responds with a \
     {status, message, results?, duration} envelope; a non-2xx status means \
     the operation failed, not the transport.";

/// Create ServerCapabilities for the MCP protocol
fn create_server_capabilities() -> ServerCapabilities {
    let mut capabilities = ServerCapabilities::default();
    capabilities.tools = Some(ToolsCapability {
        list_changed: Some(false),
    });
    capabilities
}

/// Create Implementation information for the MCP server
fn create_server_implementation() -> Implementation {
    Implementation::new("CloudGate", crate::VERSION).with_title("CloudGate MCP Server")
}

/// MCP server answering tool listings and calls from the command registry.
///
/// The advertised tool set is fixed by the exposure mode chosen at startup;
/// business failures stay inside the envelope with `is_error` mirroring the
/// status class, so transport-level errors mean transport problems only.
#[derive(Clone)]
pub struct McpServer {
    router: Arc<ExposureRouter>,
    context: Arc<ToolContext>,
}

impl McpServer {
    pub fn new(router: Arc<ExposureRouter>, context: Arc<ToolContext>) -> Self {
        Self { router, context }
    }

    /// The advertised tools under the active exposure mode
    pub fn list_tools(&self) -> Vec<Tool> {
        self.router
            .list_tools()
            .into_iter()
            .map(Self::to_rmcp_tool)
            .collect()
    }

    /// Dispatch one tool call and wrap its envelope
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let envelope = self.router.dispatch(name, arguments, &self.context).await;
        let rendered = serde_json::to_string_pretty(&envelope)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        if envelope.is_success() {
            Ok(CallToolResult::success(vec![Content::text(rendered)]))
        } else {
            Ok(CallToolResult::error(vec![Content::text(rendered)]))
        }
    }

    fn to_rmcp_tool(descriptor: ToolDescriptor) -> Tool {
        Tool::new(
            descriptor.advertised_name,
            descriptor.description,
            Arc::new(descriptor.input_schema),
        )
    }
}

impl ServerHandler for McpServer {
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        tracing::info!(
            client = %request.client_info.name,
            version = %request.client_info.version,
            mode = %self.router.mode(),
            "MCP client connecting"
        );
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            meta: None,
            tools: self.list_tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "call_tool received");
        self.call(&request.name, request.arguments.unwrap_or_default())
            .await
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(create_server_capabilities())
            .with_protocol_version(ProtocolVersion::default())
            .with_server_info(create_server_implementation())
            .with_instructions(SERVER_INSTRUCTIONS)
    }
}
