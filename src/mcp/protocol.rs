//! JSON-RPC 2.0 protocol types
//!
//! Request/response envelopes for MCP over stdio, error codes, and the MCP
//! payload shapes this server returns (tool text content, resources).

use crate::error::MemoryBankError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision advertised on `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Content type of every resource
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TOOL_FAILED: i32 = -32000;
    pub const CONFIGURATION_MISSING: i32 = -32001;
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
    pub const DOCUMENT_NOT_FOUND: i32 = -32004;
}

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,

    pub method: String,

    #[serde(default)]
    pub params: Value,

    /// Request ID (absent for notifications)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Notifications carry no id and get no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request ID (echoed from request, null when unknown)
    pub id: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method.into()),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL_ERROR, message)
    }

    /// Application error (custom code)
    pub fn application_error(code: i32, message: impl Into<String>) -> Self {
        Self::new(code, message)
    }
}

impl From<&MemoryBankError> for JsonRpcError {
    fn from(err: &MemoryBankError) -> Self {
        let code = match err {
            MemoryBankError::MissingArgument(_) | MemoryBankError::InvalidArgument(_) => {
                codes::INVALID_PARAMS
            }
            MemoryBankError::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            MemoryBankError::McpProtocol(_) => codes::INVALID_REQUEST,
            MemoryBankError::InvalidResource(_) => codes::RESOURCE_NOT_FOUND,
            MemoryBankError::ConfigurationMissing(_) => codes::CONFIGURATION_MISSING,
            MemoryBankError::DocumentNotFound { .. } => codes::DOCUMENT_NOT_FOUND,
            _ => codes::TOOL_FAILED,
        };
        Self::new(code, err.to_string())
    }
}

/// Tool descriptor returned by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,

    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,
}

/// Resource descriptor returned by `resources/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// One entry of a `resources/read` result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_id_is_notification() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_null());
    }

    #[test]
    fn test_response_serialization() {
        let response = JsonRpcResponse::success(Some(json!(1)), json!({"status": "ok"}));

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_response() {
        let response = JsonRpcResponse::error(
            Some(json!(1)),
            JsonRpcError::method_not_found("invalid_method"),
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("-32601"));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_bank_error_codes() {
        let missing = JsonRpcError::from(&MemoryBankError::MissingArgument("projectPath".into()));
        assert_eq!(missing.code, codes::INVALID_PARAMS);
        assert!(missing.message.contains("projectPath"));

        let config = JsonRpcError::from(&MemoryBankError::ConfigurationMissing("x".into()));
        let resource = JsonRpcError::from(&MemoryBankError::InvalidResource("x".into()));
        assert_ne!(config.code, resource.code);
    }

    #[test]
    fn test_descriptors_use_camel_case() {
        let tool = Tool {
            name: "track_progress".to_string(),
            description: "d".to_string(),
            input_schema: json!({"type": "object"}),
        };
        assert!(serde_json::to_string(&tool).unwrap().contains("\"inputSchema\""));

        let contents = ResourceContents {
            uri: "memory://progress".to_string(),
            mime_type: MARKDOWN_MIME_TYPE.to_string(),
            text: "# Progress Log\n".to_string(),
        };
        assert!(serde_json::to_string(&contents).unwrap().contains("\"mimeType\":\"text/markdown\""));
    }
}
