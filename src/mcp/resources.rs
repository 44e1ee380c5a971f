//! MCP resources: the four memory bank documents, read-only
//!
//! The project is taken from the request's `projectPath` when present and
//! from the configured project path otherwise.

use super::protocol::{ResourceContents, ResourceDescriptor, MARKDOWN_MIME_TYPE};
use crate::config::BankConfig;
use crate::error::{MemoryBankError, Result};
use crate::storage::DocumentStore;
use crate::types::DocumentKind;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ResourceHandler {
    store: Arc<dyn DocumentStore>,
    config: BankConfig,
}

impl ResourceHandler {
    pub fn new(store: Arc<dyn DocumentStore>, config: BankConfig) -> Self {
        Self { store, config }
    }

    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        DocumentKind::ALL
            .into_iter()
            .map(|kind| ResourceDescriptor {
                uri: kind.resource_uri().to_string(),
                name: kind.title().to_string(),
                description: kind.description().to_string(),
                mime_type: MARKDOWN_MIME_TYPE.to_string(),
            })
            .collect()
    }

    /// Read a document by resource URI
    pub async fn read(&self, uri: &str, project: Option<&Path>) -> Result<ResourceContents> {
        let kind = DocumentKind::from_resource_uri(uri)
            .ok_or_else(|| MemoryBankError::InvalidResource(uri.to_string()))?;

        let project = match project {
            Some(project) => project,
            None => self.config.require_project_path()?,
        };

        debug!("Reading resource {} from {}", uri, project.display());
        let text = self.store.read(project, kind).await?;

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: MARKDOWN_MIME_TYPE.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsDocumentStore;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_lists_all_documents() {
        let handler = ResourceHandler::new(Arc::new(FsDocumentStore::new()), BankConfig::default());
        let uris: Vec<_> = handler
            .list_resources()
            .into_iter()
            .map(|r| r.uri)
            .collect();
        assert_eq!(
            uris,
            vec![
                "memory://project/context",
                "memory://active/context",
                "memory://progress",
                "memory://decisions"
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_uri_checked_first() {
        let handler = ResourceHandler::new(Arc::new(FsDocumentStore::new()), BankConfig::default());
        let err = handler.read("memory://unknown", None).await.unwrap_err();
        assert!(matches!(err, MemoryBankError::InvalidResource(_)));
    }

    #[tokio::test]
    async fn test_missing_project_path_is_configuration_error() {
        let handler = ResourceHandler::new(Arc::new(FsDocumentStore::new()), BankConfig::default());
        let err = handler.read("memory://decisions", None).await.unwrap_err();
        assert!(matches!(err, MemoryBankError::ConfigurationMissing(ref m) if m.contains("--project-path")));
    }

    #[tokio::test]
    async fn test_explicit_path_overrides_default() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FsDocumentStore::new());
        store.ensure_directory(temp.path()).await.unwrap();
        store
            .write(temp.path(), DocumentKind::Progress, "# Progress Log\n")
            .await
            .unwrap();

        let config =
            BankConfig::default().with_project_path(Some(PathBuf::from("/nonexistent/project")));
        let handler = ResourceHandler::new(store, config);
        let contents = handler
            .read("memory://progress", Some(temp.path()))
            .await
            .unwrap();
        assert_eq!(contents.text, "# Progress Log\n");
        assert_eq!(contents.mime_type, "text/markdown");
    }
}
