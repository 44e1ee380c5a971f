//! Core data types for the memory bank
//!
//! Request payloads (decisions, progress snapshots, session updates), the
//! inspector's derived project snapshot, and the four document kinds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of a technical decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Proposed,
    Accepted,
    Rejected,
    Superseded,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Proposed => "proposed",
            DecisionStatus::Accepted => "accepted",
            DecisionStatus::Rejected => "rejected",
            DecisionStatus::Superseded => "superseded",
        }
    }

    /// Proposed decisions are still open; everything else has been settled
    pub fn is_pending(&self) -> bool {
        matches!(self, DecisionStatus::Proposed)
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A technical decision entry
///
/// Records are append-only: a changed decision is recorded again rather
/// than edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    /// Short title, also the record's identity
    pub title: String,

    pub description: String,

    pub rationale: String,

    pub status: DecisionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_decisions: Option<Vec<String>>,

    /// YYYY-MM-DD; today's date is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One progress reporting event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub completed: Vec<String>,

    pub in_progress: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Vec<String>>,
}

impl ProgressSnapshot {
    /// Blocked items, treating an absent list as empty
    pub fn blocked_items(&self) -> &[String] {
        self.blocked.as_deref().unwrap_or(&[])
    }
}

/// Session details appended to the active context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSession {
    pub date: String,
    pub mode: String,
    pub task: String,
}

/// Payload of `update_context`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub current_session: CurrentSession,
}

/// Project metadata read from the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub license: Option<String>,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,

    /// Manifest filename the metadata came from, if any
    pub manifest: Option<String>,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            license: None,
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            manifest: None,
        }
    }
}

impl ProjectInfo {
    /// Runtime and development dependency names, runtime first
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .map(String::as_str)
    }
}

/// Technologies detected in the project tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    pub languages: BTreeSet<String>,
    pub frameworks: Vec<String>,
    pub config_files: BTreeSet<String>,
}

impl TechStack {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.frameworks.is_empty() && self.config_files.is_empty()
    }
}

/// The four documents kept in a project's memory bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    ProductContext,
    ActiveContext,
    Progress,
    DecisionLog,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::ProductContext,
        DocumentKind::ActiveContext,
        DocumentKind::Progress,
        DocumentKind::DecisionLog,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            DocumentKind::ProductContext => "productContext.md",
            DocumentKind::ActiveContext => "activeContext.md",
            DocumentKind::Progress => "progress.md",
            DocumentKind::DecisionLog => "decisionLog.md",
        }
    }

    /// Level-1 heading every document of this kind starts with
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::ProductContext => "Project Context",
            DocumentKind::ActiveContext => "Active Context",
            DocumentKind::Progress => "Progress Log",
            DocumentKind::DecisionLog => "Decision Log",
        }
    }

    pub fn resource_uri(&self) -> &'static str {
        match self {
            DocumentKind::ProductContext => "memory://project/context",
            DocumentKind::ActiveContext => "memory://active/context",
            DocumentKind::Progress => "memory://progress",
            DocumentKind::DecisionLog => "memory://decisions",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DocumentKind::ProductContext => "Project overview, technical stack and dependencies",
            DocumentKind::ActiveContext => "Current session state and focus",
            DocumentKind::Progress => "Completed, in-progress and blocked work",
            DocumentKind::DecisionLog => "Technical and pending decisions",
        }
    }

    pub fn from_resource_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.resource_uri() == uri)
    }

    /// Parse a short CLI name (`product`, `active`, `progress`, `decisions`)
    /// or a filename
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "product" | "product-context" | "project" | "productcontext.md" => {
                Some(DocumentKind::ProductContext)
            }
            "active" | "active-context" | "activecontext.md" => Some(DocumentKind::ActiveContext),
            "progress" | "progress.md" => Some(DocumentKind::Progress),
            "decisions" | "decision-log" | "decisionlog.md" => Some(DocumentKind::DecisionLog),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decision_deserializes_camel_case() {
        let decision: DecisionRecord = serde_json::from_value(json!({
            "title": "Use SQLite",
            "description": "Embedded storage",
            "rationale": "No server to run",
            "status": "accepted",
            "relatedDecisions": ["Drop Postgres"]
        }))
        .unwrap();

        assert_eq!(decision.status, DecisionStatus::Accepted);
        assert_eq!(
            decision.related_decisions,
            Some(vec!["Drop Postgres".to_string()])
        );
        assert!(decision.alternatives.is_none());
        assert!(decision.date.is_none());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<DecisionRecord, _> = serde_json::from_value(json!({
            "title": "t", "description": "d", "rationale": "r", "status": "maybe"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_blocked_optional() {
        let snapshot: ProgressSnapshot = serde_json::from_value(json!({
            "completed": ["A"],
            "inProgress": []
        }))
        .unwrap();
        assert!(snapshot.blocked.is_none());
        assert!(snapshot.blocked_items().is_empty());
    }

    #[test]
    fn test_document_kind_lookup() {
        for kind in DocumentKind::ALL {
            assert_eq!(DocumentKind::from_resource_uri(kind.resource_uri()), Some(kind));
        }
        assert_eq!(DocumentKind::from_resource_uri("memory://nope"), None);
        assert_eq!(DocumentKind::from_name("decisions"), Some(DocumentKind::DecisionLog));
        assert_eq!(DocumentKind::from_name("activeContext.md"), Some(DocumentKind::ActiveContext));
    }

    #[test]
    fn test_project_info_defaults() {
        let info = ProjectInfo::default();
        assert_eq!(info.name, "Unknown");
        assert_eq!(info.version, "0.1.0");
        assert_eq!(info.all_dependencies().count(), 0);
    }
}
