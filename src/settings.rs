//! MCP client settings registration
//!
//! Registers this server in a client's JSON settings file under
//! `mcpServers.<name>`, pointing it at the initialized project. Other
//! servers and unrelated keys in the file are preserved.

use crate::error::{MemoryBankError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable carrying the project path to the server
pub const PROJECT_PATH_ENV: &str = "MEMORY_BANK_PROJECT_PATH";

/// MCP server entry written to the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerEntry {
    /// Command to run the MCP server
    pub command: String,

    /// Arguments for the command
    pub args: Vec<String>,

    /// Environment variables
    pub env: BTreeMap<String, String>,
}

/// Writes the server registration into a settings file
#[derive(Debug, Clone)]
pub struct SettingsRegistry {
    path: PathBuf,
    server_name: String,
    command: String,
}

impl SettingsRegistry {
    pub fn new(path: PathBuf, server_name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            path,
            server_name: server_name.into(),
            command: command.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_for(&self, project: &Path) -> McpServerEntry {
        let mut env = BTreeMap::new();
        env.insert(
            PROJECT_PATH_ENV.to_string(),
            project.to_string_lossy().to_string(),
        );
        McpServerEntry {
            command: self.command.clone(),
            args: vec!["serve".to_string()],
            env,
        }
    }

    /// Register the server for `project`, creating the file if needed
    pub async fn register(&self, project: &Path) -> Result<()> {
        let mut root = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Value::Object(Map::new()),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file {} not found, creating it", self.path.display());
                Value::Object(Map::new())
            }
            Err(e) => return Err(e.into()),
        };

        merge_entry(&mut root, &self.server_name, &self.entry_for(project))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&root)?).await?;

        info!(
            "Registered '{}' for {} in {}",
            self.server_name,
            project.display(),
            self.path.display()
        );
        Ok(())
    }
}

/// Merge the entry into `root.mcpServers[name]`, keeping keys the entry
/// does not set (e.g. `disabled`, `autoApprove`)
fn merge_entry(root: &mut Value, name: &str, entry: &McpServerEntry) -> Result<()> {
    let not_object = |what: &str| {
        MemoryBankError::Other(format!("Settings file is malformed: {} is not an object", what))
    };

    let servers = root
        .as_object_mut()
        .ok_or_else(|| not_object("root"))?
        .entry("mcpServers")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_object("mcpServers"))?;

    let existing = servers
        .entry(name.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_object(name))?;

    existing.insert("command".to_string(), Value::String(entry.command.clone()));
    existing.insert("args".to_string(), serde_json::to_value(&entry.args)?);

    let env = existing
        .entry("env")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| not_object("env"))?;
    for (key, value) in &entry.env {
        env.insert(key.clone(), Value::String(value.clone()));
    }

    Ok(())
}
