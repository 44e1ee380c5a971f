//! Storage layer for the memory bank
//!
//! Documents live under `<project>/memory-bank/`, one markdown file per
//! [`DocumentKind`]. Writes are whole-file overwrites.

pub mod fs;

use crate::error::Result;
use crate::types::DocumentKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use fs::FsDocumentStore;

/// Directory (relative to the project root) holding the documents
pub const MEMORY_BANK_DIR: &str = "memory-bank";

/// Storage backend for memory bank documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Path of a document inside a project's memory bank
    fn document_path(&self, project: &Path, kind: DocumentKind) -> PathBuf {
        project.join(MEMORY_BANK_DIR).join(kind.file_name())
    }

    /// Create the memory bank directory if missing, returning its path
    async fn ensure_directory(&self, project: &Path) -> Result<PathBuf>;

    /// Read a document's full text
    async fn read(&self, project: &Path, kind: DocumentKind) -> Result<String>;

    /// Replace a document's full text
    async fn write(&self, project: &Path, kind: DocumentKind, text: &str) -> Result<()>;

    /// Whether a document exists
    async fn exists(&self, project: &Path, kind: DocumentKind) -> Result<bool>;
}
