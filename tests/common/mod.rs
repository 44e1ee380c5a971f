//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use memory_bank_core::error::{MemoryBankError, Result};
use memory_bank_core::{DocumentKind, DocumentStore, FsDocumentStore, ToolHandler};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Tool handler over the filesystem store, plus an empty project directory
pub fn create_test_handler() -> (ToolHandler, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let handler = ToolHandler::new(Arc::new(FsDocumentStore::new()));
    (handler, temp_dir)
}

/// Create a temporary project with a package.json manifest
pub fn create_node_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("package.json"),
        r#"{
  "name": "web-app",
  "version": "2.1.0",
  "description": "Storefront",
  "dependencies": { "react": "^18.0.0", "express": "^4.18.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
    )
    .unwrap();
    std::fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    std::fs::write(temp_dir.path().join("src/index.ts"), "export {};\n").unwrap();
    std::fs::write(temp_dir.path().join("tsconfig.json"), "{}\n").unwrap();
    temp_dir
}

pub async fn initialize(handler: &ToolHandler, project: &Path) -> String {
    handler
        .execute(
            "initialize_memory_bank",
            json!({ "projectPath": project.to_string_lossy() }),
        )
        .await
        .expect("initialization should succeed")
}

pub fn read_document(project: &Path, kind: DocumentKind) -> String {
    std::fs::read_to_string(project.join("memory-bank").join(kind.file_name())).unwrap()
}

pub fn progress_params(project: &Path, completed: &[&str], in_progress: &[&str]) -> Value {
    json!({
        "projectPath": project.to_string_lossy(),
        "progress": {
            "completed": completed,
            "inProgress": in_progress
        }
    })
}

pub fn decision_params(project: &Path, title: &str, status: &str) -> Value {
    json!({
        "projectPath": project.to_string_lossy(),
        "decision": {
            "title": title,
            "description": format!("{} description", title),
            "rationale": "Fits the workload",
            "status": status,
            "date": "2024-05-01"
        }
    })
}

/// Filesystem store that rejects progress writes after a fixed number of them
pub struct FailingProgressStore {
    inner: FsDocumentStore,
    allowed_writes: usize,
    progress_writes: AtomicUsize,
}

impl FailingProgressStore {
    pub fn new(allowed_writes: usize) -> Self {
        Self {
            inner: FsDocumentStore::new(),
            allowed_writes,
            progress_writes: AtomicUsize::new(0),
        }
    }

    pub fn progress_writes(&self) -> usize {
        self.progress_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FailingProgressStore {
    async fn ensure_directory(&self, project: &Path) -> Result<PathBuf> {
        self.inner.ensure_directory(project).await
    }

    async fn read(&self, project: &Path, kind: DocumentKind) -> Result<String> {
        self.inner.read(project, kind).await
    }

    async fn write(&self, project: &Path, kind: DocumentKind, text: &str) -> Result<()> {
        if kind == DocumentKind::Progress {
            let count = self.progress_writes.fetch_add(1, Ordering::SeqCst) + 1;
            if count > self.allowed_writes {
                return Err(MemoryBankError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "progress.md is read-only",
                )));
            }
        }
        self.inner.write(project, kind, text).await
    }

    async fn exists(&self, project: &Path, kind: DocumentKind) -> Result<bool> {
        self.inner.exists(project, kind).await
    }
}
