//! MCP server: the tool registry exposed through `rmcp` over stdin/stdout.
//!
//! stdout carries protocol frames only; logs must go to stderr.
use std::sync::Arc;

use anyhow::{Result, anyhow};
use qrscan_core::ToolRegistry;
use rmcp::{
    ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
        InitializeRequestParam, InitializeResult, JsonObject, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool as McpTool,
    },
    service::{RequestContext, RoleServer},
};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "qr-code-scanner";

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve the process's stdin/stdout until stdin closes.
    pub async fn run_stdio(self) -> Result<()> {
        self.run(tokio::io::stdin(), tokio::io::stdout()).await
    }

    pub async fn run<R, W>(self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        info!(tools = self.registry.len(), "MCP server started");
        let service = self
            .serve((reader, writer))
            .await
            .map_err(|e| anyhow!("MCP handshake failed: {e}"))?;
        let reason = service.waiting().await?;
        info!(reason = ?reason, "MCP session ended");
        Ok(())
    }

    fn tools(&self) -> Vec<McpTool> {
        self.registry
            .descriptors()
            .into_iter()
            .map(|d| {
                let schema = match d.input_schema {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                McpTool::new(d.name, d.description, Arc::new(schema))
            })
            .collect()
    }
}

/// A tool's output is a serialized scan result; `success: false` in it marks
/// the call as an error for the client.
fn reports_failure(text: &str) -> bool {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("success").and_then(Value::as_bool))
        .is_some_and(|success| !success)
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Detect and decode QR codes from local files, base64 payloads or image URLs."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        info!(
            protocol_version = ?request.protocol_version,
            client = %request.client_info.name,
            "Client initialized"
        );
        let mut info = self.get_info();
        info.protocol_version = request.protocol_version;
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self
            .registry
            .get(&request.name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", request.name), None))?;

        let arguments = Value::Object(request.arguments.unwrap_or_default());
        debug!(tool = %request.name, "Calling tool");
        match tool.execute(arguments).await {
            Ok(text) if reports_failure(&text) => Ok(CallToolResult::error(vec![Content::text(text)])),
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                warn!(tool = %request.name, error = %e, "Tool execution failed");
                Ok(CallToolResult::error(vec![Content::text(format!("Error: {e}"))]))
            }
        }
    }
}
