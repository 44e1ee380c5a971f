//! Model Context Protocol (MCP) server implementation
//!
//! JSON-RPC 2.0 over stdio. Exposes the memory bank documents as resources
//! and four tools that update them.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use resources::ResourceHandler;
pub use server::McpServer;
pub use tools::ToolHandler;
