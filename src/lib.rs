//! Memory Bank - project-scoped markdown memory for development sessions
//!
//! Maintains four markdown documents under `<project>/memory-bank/`:
//! - `productContext.md`: project overview and detected technical stack
//! - `activeContext.md`: current session state
//! - `progress.md`: completed, in-progress and blocked work
//! - `decisionLog.md`: technical and pending decisions
//!
//! # Architecture
//!
//! - **Storage**: [`DocumentStore`] reads and writes whole documents
//! - **Document**: structured markdown model and the section editor
//! - **Inspector**: manifest and directory-tree inspection
//! - **Templates**: initial document contents and entry rendering
//! - **MCP**: JSON-RPC server exposing tools and resources over stdio
//!
//! # Example
//!
//! ```ignore
//! use memory_bank_core::{FsDocumentStore, ToolHandler};
//! use std::sync::Arc;
//!
//! let tools = ToolHandler::new(Arc::new(FsDocumentStore::new()));
//! tools
//!     .execute(
//!         "initialize_memory_bank",
//!         serde_json::json!({ "projectPath": "/work/my-app" }),
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod inspector;
pub mod mcp;
pub mod session;
pub mod settings;
pub mod storage;
pub mod templates;
pub mod types;

// Re-export commonly used types
pub use config::BankConfig;
pub use document::MarkdownDocument;
pub use error::{MemoryBankError, Result};
pub use mcp::{McpServer, ResourceHandler, ToolHandler};
pub use session::ProgressTally;
pub use settings::SettingsRegistry;
pub use storage::{DocumentStore, FsDocumentStore};
pub use types::{
    CurrentSession, DecisionRecord, DecisionStatus, DocumentKind, ProgressSnapshot, ProjectInfo,
    SessionUpdate, TechStack,
};
