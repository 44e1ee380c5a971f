//! Filesystem document store

use super::{DocumentStore, MEMORY_BANK_DIR};
use crate::error::{MemoryBankError, Result};
use crate::types::DocumentKind;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores documents as plain files with `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct FsDocumentStore;

impl FsDocumentStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn ensure_directory(&self, project: &Path) -> Result<PathBuf> {
        let dir = project.join(MEMORY_BANK_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        debug!("Memory bank directory ready: {}", dir.display());
        Ok(dir)
    }

    async fn read(&self, project: &Path, kind: DocumentKind) -> Result<String> {
        let path = self.document_path(project, kind);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(MemoryBankError::DocumentNotFound {
                document: kind.file_name().to_string(),
                path,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, project: &Path, kind: DocumentKind, text: &str) -> Result<()> {
        let path = self.document_path(project, kind);
        tokio::fs::write(&path, text).await?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }

    async fn exists(&self, project: &Path, kind: DocumentKind) -> Result<bool> {
        let path = self.document_path(project, kind);
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let store = FsDocumentStore::new();

        let dir = store.ensure_directory(temp.path()).await.unwrap();
        assert!(dir.ends_with(MEMORY_BANK_DIR));

        store
            .write(temp.path(), DocumentKind::Progress, "# Progress Log\n")
            .await
            .unwrap();
        let text = store.read(temp.path(), DocumentKind::Progress).await.unwrap();
        assert_eq!(text, "# Progress Log\n");
        assert!(store.exists(temp.path(), DocumentKind::Progress).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let temp = TempDir::new().unwrap();
        let store = FsDocumentStore::new();
        store.ensure_directory(temp.path()).await.unwrap();

        let err = store
            .read(temp.path(), DocumentKind::DecisionLog)
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryBankError::DocumentNotFound { ref document, .. } if document == "decisionLog.md"));
        assert!(!store.exists(temp.path(), DocumentKind::DecisionLog).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_without_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = FsDocumentStore::new();

        let err = store
            .write(temp.path(), DocumentKind::ActiveContext, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryBankError::Io(_)));
    }
}
