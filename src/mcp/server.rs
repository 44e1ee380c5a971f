//! MCP server with stdio transport
//!
//! Reads one JSON-RPC message per line and answers each request before
//! reading the next. Notifications are handled without a response.

use super::protocol::{codes, JsonRpcError, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use super::resources::ResourceHandler;
use super::tools::ToolHandler;
use crate::error::{MemoryBankError, Result};
use serde_json::{json, Value};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// MCP server that handles JSON-RPC requests
pub struct McpServer {
    tool_handler: ToolHandler,
    resource_handler: ResourceHandler,
    server_name: String,
}

impl McpServer {
    pub fn new(
        tool_handler: ToolHandler,
        resource_handler: ResourceHandler,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            tool_handler,
            resource_handler,
            server_name: server_name.into(),
        }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        info!("MCP server started, listening on stdin...");
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await?;
        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC over any reader/writer pair
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            if reader.read_line(&mut line).await? == 0 {
                debug!("Received EOF, shutting down");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            debug!("Received request: {}", message);

            let Some(response) = self.handle_message(message).await else {
                continue;
            };

            let response_json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize response: {}", e);
                    serde_json::to_string(&JsonRpcResponse::error(
                        response.id.clone(),
                        JsonRpcError::internal_error(format!("Serialization error: {}", e)),
                    ))?
                }
            };
            debug!("Sending response: {}", response_json);

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            let err = MemoryBankError::McpProtocol(format!(
                "unsupported jsonrpc version '{}'",
                request.jsonrpc
            ));
            return Some(JsonRpcResponse::error(
                request.id.clone(),
                JsonRpcError::from(&err),
            ));
        }

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();
        let response = match self.dispatch(&request).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        };
        Some(response)
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tool_handler.list_tools() })),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "resources/list" => Ok(json!({ "resources": self.resource_handler.list_resources() })),
            "resources/read" => self.handle_resources_read(&request.params).await,
            method => Err(JsonRpcError::method_not_found(method)),
        }
    }

    fn handle_initialize(&self) -> Value {
        debug!("Handling initialize");
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {},
                "resources": {}
            }
        })
    }

    async fn handle_tools_call(&self, params: &Value) -> std::result::Result<Value, JsonRpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| JsonRpcError::invalid_params("params must be an object"))?;

        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::invalid_params("missing 'name' field"))?;

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(Value::Object(serde_json::Map::new()));

        match self.tool_handler.execute(tool_name, arguments).await {
            Ok(text) => Ok(json!({
                "content": [{ "type": "text", "text": text }]
            })),
            Err(e) if e.is_request_error() => Err(JsonRpcError::from(&e)),
            Err(MemoryBankError::OperationFailed(message)) => Err(tool_failed(message)),
            Err(e) => Err(tool_failed(e.to_string())),
        }
    }

    async fn handle_resources_read(
        &self,
        params: &Value,
    ) -> std::result::Result<Value, JsonRpcError> {
        let uri = params
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or_else(|| JsonRpcError::invalid_params("missing 'uri' field"))?;
        let project = params
            .get("projectPath")
            .and_then(|v| v.as_str())
            .map(Path::new);

        let contents = self
            .resource_handler
            .read(uri, project)
            .await
            .map_err(|e| JsonRpcError::from(&e))?;

        Ok(json!({ "contents": [contents] }))
    }
}

fn tool_failed(message: String) -> JsonRpcError {
    JsonRpcError::application_error(
        codes::TOOL_FAILED,
        format!("Tool execution failed: {}", message),
    )
}
