//! MCP tool implementations
//!
//! Four tools maintain a project's memory bank:
//! - `initialize_memory_bank`: inspect the project and write all documents
//! - `update_context`: append a session update to the active context
//! - `record_decision`: add a decision to the decision log
//! - `track_progress`: append a progress block, with periodic auto-saves

use super::protocol::Tool;
use crate::document::editor;
use crate::error::{MemoryBankError, Result};
use crate::inspector;
use crate::session::{ProgressTally, DEFAULT_AUTO_SAVE_THRESHOLD};
use crate::settings::SettingsRegistry;
use crate::storage::DocumentStore;
use crate::templates;
use crate::types::{
    DecisionRecord, DocumentKind, ProgressSnapshot, ProjectInfo, SessionUpdate, TechStack,
};
use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const INITIALIZE_MEMORY_BANK: &str = "initialize_memory_bank";
pub const UPDATE_CONTEXT: &str = "update_context";
pub const RECORD_DECISION: &str = "record_decision";
pub const TRACK_PROGRESS: &str = "track_progress";

/// Tool handler that dispatches to appropriate implementation
pub struct ToolHandler {
    store: Arc<dyn DocumentStore>,
    settings: Option<SettingsRegistry>,
    auto_save_threshold: usize,
    tallies: Mutex<HashMap<PathBuf, ProgressTally>>,
}

impl ToolHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            settings: None,
            auto_save_threshold: DEFAULT_AUTO_SAVE_THRESHOLD,
            tallies: Mutex::new(HashMap::new()),
        }
    }

    /// Register the server in a client settings file on initialization
    pub fn with_settings(mut self, settings: Option<SettingsRegistry>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_auto_save_threshold(mut self, threshold: usize) -> Self {
        self.auto_save_threshold = threshold;
        self
    }

    /// Get list of all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        let path_schema = serde_json::json!({
            "type": "string",
            "description": "Absolute path of the project root"
        });
        let string_list = serde_json::json!({"type": "array", "items": {"type": "string"}});

        vec![
            Tool {
                name: INITIALIZE_MEMORY_BANK.to_string(),
                description: "Create the memory-bank directory and write the project context, active context, progress and decision log documents from an inspection of the project.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": { "projectPath": path_schema },
                    "required": ["projectPath"]
                }),
            },
            Tool {
                name: UPDATE_CONTEXT.to_string(),
                description: "Append a session update (date, mode, task) to the active context.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "projectPath": path_schema,
                        "content": {
                            "type": "object",
                            "properties": {
                                "currentSession": {
                                    "type": "object",
                                    "properties": {
                                        "date": {"type": "string"},
                                        "mode": {"type": "string"},
                                        "task": {"type": "string"}
                                    },
                                    "required": ["date", "mode", "task"]
                                }
                            },
                            "required": ["currentSession"]
                        }
                    },
                    "required": ["projectPath", "content"]
                }),
            },
            Tool {
                name: RECORD_DECISION.to_string(),
                description: "Record a technical decision. Proposed decisions go under Pending Decisions, all others under Technical Decisions.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "projectPath": path_schema,
                        "decision": {
                            "type": "object",
                            "properties": {
                                "title": {"type": "string"},
                                "description": {"type": "string"},
                                "rationale": {"type": "string"},
                                "status": {
                                    "type": "string",
                                    "enum": ["proposed", "accepted", "rejected", "superseded"]
                                },
                                "alternatives": string_list,
                                "impact": {"type": "string"},
                                "relatedDecisions": string_list,
                                "date": {"type": "string", "description": "YYYY-MM-DD, defaults to today"}
                            },
                            "required": ["title", "description", "rationale", "status"]
                        }
                    },
                    "required": ["projectPath", "decision"]
                }),
            },
            Tool {
                name: TRACK_PROGRESS.to_string(),
                description: "Append completed, in-progress and blocked tasks to the progress log.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "projectPath": path_schema,
                        "progress": {
                            "type": "object",
                            "properties": {
                                "completed": string_list,
                                "inProgress": string_list,
                                "blocked": string_list
                            },
                            "required": ["completed", "inProgress"]
                        }
                    },
                    "required": ["projectPath", "progress"]
                }),
            },
        ]
    }

    /// Execute a tool call, returning its confirmation text
    ///
    /// Argument errors are returned as-is; any other failure is wrapped in
    /// [`MemoryBankError::OperationFailed`].
    pub async fn execute(&self, tool_name: &str, params: Value) -> Result<String> {
        debug!("Executing tool: {}", tool_name);

        let result = match tool_name {
            INITIALIZE_MEMORY_BANK => self.initialize_memory_bank(params).await,
            UPDATE_CONTEXT => self.update_context(params).await,
            RECORD_DECISION => self.record_decision(params).await,
            TRACK_PROGRESS => self.track_progress(params).await,
            _ => {
                warn!("Unknown tool: {}", tool_name);
                return Err(MemoryBankError::UnknownTool(tool_name.to_string()));
            }
        };

        result.map_err(|e| {
            if e.is_request_error() {
                e
            } else {
                MemoryBankError::OperationFailed(e.to_string())
            }
        })
    }

    /// Accumulated progress for a project since the last auto-save
    pub async fn progress_tally(&self, project: &Path) -> Option<ProgressTally> {
        self.tallies.lock().await.get(project).cloned()
    }

    async fn initialize_memory_bank(&self, params: Value) -> Result<String> {
        let project = project_path(&params)?;

        let dir = self.store.ensure_directory(&project).await?;

        let root = project.clone();
        let (info, stack) = tokio::task::spawn_blocking(move || inspector::inspect(&root))
            .await
            .unwrap_or_else(|e| {
                warn!("Project inspection aborted, using defaults: {}", e);
                (ProjectInfo::default(), TechStack::default())
            });

        let documents = templates::initial_documents(&info, &stack, &today());
        for kind in DocumentKind::ALL {
            if self.store.exists(&project, kind).await? {
                info!("Overwriting existing {}", kind);
            }
            self.store.write(&project, kind, documents.get(kind)).await?;
        }
        info!("Initialized memory bank for '{}' at {}", info.name, dir.display());

        let mut message = format!("Memory bank initialized at {}", dir.display());
        if let Some(settings) = &self.settings {
            match settings.register(&project).await {
                Ok(()) => message.push_str(&format!(
                    "; registered in {}",
                    settings.path().display()
                )),
                Err(e) => {
                    warn!("Failed to update settings file: {}", e);
                    message.push_str(&format!("; settings file not updated: {}", e));
                }
            }
        }

        Ok(message)
    }

    async fn update_context(&self, params: Value) -> Result<String> {
        let project = project_path(&params)?;
        let update: SessionUpdate = argument(&params, "content")?;

        let current = self.store.read(&project, DocumentKind::ActiveContext).await?;
        let updated = editor::merge_active_context(&current, &update);
        self.store
            .write(&project, DocumentKind::ActiveContext, &updated)
            .await?;

        info!(
            "Active context updated (mode: {})",
            update.current_session.mode
        );
        Ok(format!(
            "Active context updated for session {}",
            update.current_session.date
        ))
    }

    async fn record_decision(&self, params: Value) -> Result<String> {
        let project = project_path(&params)?;
        let decision: DecisionRecord = argument(&params, "decision")?;

        let current = self.store.read(&project, DocumentKind::DecisionLog).await?;
        let updated = editor::append_decision(&current, &decision, &today())?;
        self.store
            .write(&project, DocumentKind::DecisionLog, &updated)
            .await?;

        let section = editor::decision_section(&decision);
        info!("Recorded decision '{}' under {}", decision.title, section);
        Ok(format!(
            "Decision '{}' recorded under {}",
            decision.title, section
        ))
    }

    async fn track_progress(&self, params: Value) -> Result<String> {
        let project = project_path(&params)?;
        let snapshot: ProgressSnapshot = argument(&params, "progress")?;

        let current = self.store.read(&project, DocumentKind::Progress).await?;
        let heading = format!("Progress Update ({})", timestamp());
        let updated = editor::append_progress(&current, &snapshot, &heading);
        self.store
            .write(&project, DocumentKind::Progress, &updated)
            .await?;
        info!(
            "Progress updated: {} completed, {} in progress",
            snapshot.completed.len(),
            snapshot.in_progress.len()
        );

        let flushed = {
            let mut tallies = self.tallies.lock().await;
            tallies
                .entry(project.clone())
                .or_insert_with(|| ProgressTally::new(self.auto_save_threshold))
                .record(&snapshot)
        };

        if let Some(accumulated) = flushed {
            // Not surfaced: the caller's own update already succeeded
            if let Err(e) = self.auto_save(&project, &accumulated).await {
                warn!("Progress auto-save failed: {}", e);
            }
        }

        Ok("Progress updated".to_string())
    }

    async fn auto_save(&self, project: &Path, accumulated: &ProgressSnapshot) -> Result<()> {
        let current = self.store.read(project, DocumentKind::Progress).await?;
        let heading = format!("Auto-saved Progress ({})", timestamp());
        let updated = editor::append_progress(&current, accumulated, &heading);
        self.store
            .write(project, DocumentKind::Progress, &updated)
            .await?;
        info!("Auto-saved accumulated progress for {}", project.display());
        Ok(())
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A required top-level field, rejecting absent and null values
fn required<'a>(params: &'a Value, field: &str) -> Result<&'a Value> {
    params
        .get(field)
        .filter(|value| !value.is_null())
        .ok_or_else(|| MemoryBankError::MissingArgument(field.to_string()))
}

fn project_path(params: &Value) -> Result<PathBuf> {
    required(params, "projectPath")?
        .as_str()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| {
            MemoryBankError::InvalidArgument("projectPath must be a non-empty string".to_string())
        })
}

fn argument<T: DeserializeOwned>(params: &Value, field: &str) -> Result<T> {
    serde_json::from_value(required(params, field)?.clone())
        .map_err(|e| MemoryBankError::InvalidArgument(format!("{}: {}", field, e)))
}
