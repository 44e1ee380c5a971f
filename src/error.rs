//! Error types for the memory bank
//!
//! Structured errors via thiserror; anyhow is accepted at the edges and
//! folded into [`MemoryBankError::Other`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for memory bank operations
#[derive(Error, Debug)]
pub enum MemoryBankError {
    /// A required request field was absent
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A request field was present but malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Document file does not exist yet
    #[error("Document not found: {document} ({})", path.display())]
    DocumentNotFound { document: String, path: PathBuf },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecognized resource URI
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// No project path supplied and none configured
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Target section absent from a document
    #[error("Section '{section}' not found in {document}")]
    SectionNotFound { section: String, document: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Tool name not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// MCP protocol error
    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    /// Downstream failure wrapped by the dispatcher
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for memory bank operations
pub type Result<T> = std::result::Result<T, MemoryBankError>;

/// Convert anyhow::Error to MemoryBankError
impl From<anyhow::Error> for MemoryBankError {
    fn from(err: anyhow::Error) -> Self {
        MemoryBankError::Other(err.to_string())
    }
}

impl MemoryBankError {
    /// Errors the dispatcher reports as-is instead of wrapping
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            MemoryBankError::MissingArgument(_)
                | MemoryBankError::InvalidArgument(_)
                | MemoryBankError::UnknownTool(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MemoryBankError::MissingArgument("projectPath".to_string());
        assert_eq!(err.to_string(), "Missing required argument: projectPath");

        let err = MemoryBankError::SectionNotFound {
            section: "Pending Decisions".to_string(),
            document: "decisionLog.md".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Section 'Pending Decisions' not found in decisionLog.md"
        );
    }

    #[test]
    fn test_not_found_display_includes_path() {
        let err = MemoryBankError::DocumentNotFound {
            document: "progress.md".to_string(),
            path: PathBuf::from("/tmp/p/memory-bank/progress.md"),
        };
        let msg = err.to_string();
        assert!(msg.contains("progress.md"));
        assert!(msg.contains("/tmp/p/memory-bank"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: MemoryBankError = io_err.into();
        assert!(matches!(err, MemoryBankError::Io(_)));

        let err: MemoryBankError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, MemoryBankError::Other(ref m) if m == "boom"));
    }

    #[test]
    fn test_request_errors_are_not_wrapped() {
        assert!(MemoryBankError::MissingArgument("x".into()).is_request_error());
        assert!(!MemoryBankError::OperationFailed("x".into()).is_request_error());
    }
}
