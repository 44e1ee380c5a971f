//! Markdown templates for the memory bank documents
//!
//! Pure rendering: every date or timestamp comes in as a parameter.

use crate::document::{block_text, inline_text};
use crate::types::{
    DecisionRecord, DecisionStatus, DocumentKind, ProgressSnapshot, ProjectInfo, SessionUpdate,
    TechStack,
};

/// Section holding settled (accepted, rejected, superseded) decisions
pub const TECHNICAL_DECISIONS: &str = "Technical Decisions";
/// Section holding proposed decisions
pub const PENDING_DECISIONS: &str = "Pending Decisions";

pub const NO_TECHNICAL_DECISIONS: &str = "_No technical decisions recorded._";
pub const NO_PENDING_DECISIONS: &str = "_No pending decisions._";

const COMPLETED_MARKER: &str = "- [x] ";
const IN_PROGRESS_MARKER: &str = "- [ ] ";
const BLOCKED_MARKER: &str = "- [!] ";

/// Initial contents of all four documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialDocuments {
    pub product_context: String,
    pub active_context: String,
    pub progress: String,
    pub decision_log: String,
}

impl InitialDocuments {
    pub fn get(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::ProductContext => &self.product_context,
            DocumentKind::ActiveContext => &self.active_context,
            DocumentKind::Progress => &self.progress,
            DocumentKind::DecisionLog => &self.decision_log,
        }
    }
}

pub fn initial_documents(info: &ProjectInfo, stack: &TechStack, date: &str) -> InitialDocuments {
    let decisions = initial_decisions(stack, date);
    InitialDocuments {
        product_context: product_context(info, stack),
        active_context: active_context(date),
        progress: progress(date),
        decision_log: decision_log(&decisions, date),
    }
}

pub fn product_context(info: &ProjectInfo, stack: &TechStack) -> String {
    let mut out = format!("# {}\n\n## Overview\n\n", DocumentKind::ProductContext.title());
    out.push_str(&format!("- **Name**: {}\n", info.name));
    out.push_str(&format!("- **Version**: {}\n", info.version));
    if let Some(description) = &info.description {
        out.push_str(&format!("- **Description**: {}\n", description));
    }
    if let Some(license) = &info.license {
        out.push_str(&format!("- **License**: {}\n", license));
    }
    if let Some(manifest) = &info.manifest {
        out.push_str(&format!("- **Manifest**: {}\n", manifest));
    }

    out.push_str("\n## Technical Stack\n\n");
    if stack.is_empty() {
        out.push_str("- No technologies detected\n");
    } else {
        push_joined(&mut out, "Languages", stack.languages.iter());
        push_joined(&mut out, "Frameworks", stack.frameworks.iter());
        push_joined(&mut out, "Configuration Files", stack.config_files.iter());
    }

    out.push_str("\n## Dependencies\n\n");
    if info.dependencies.is_empty() && info.dev_dependencies.is_empty() {
        out.push_str("- No dependencies declared\n");
    } else {
        let groups = [
            ("Runtime", &info.dependencies),
            ("Development", &info.dev_dependencies),
        ];
        let mut first = true;
        for (label, deps) in groups {
            if deps.is_empty() {
                continue;
            }
            if !first {
                out.push('\n');
            }
            first = false;
            out.push_str(&format!("### {}\n\n", label));
            out.push_str(&bullet_list(deps, "- "));
        }
    }

    out.push_str("\n## Goals\n\n- _Describe the project's goals and key features._\n");
    out
}

pub fn active_context(date: &str) -> String {
    format!(
        "# {}\n\n\
         ## Current Session\n\n\
         - **Started**: {}\n\
         - **Mode**: initialization\n\
         - **Task**: Memory bank initialized\n\n\
         ## Current Focus\n\n\
         - Review the generated project context\n\n\
         ## Open Questions\n\n\
         - _None recorded._\n\n\
         ## Session Updates\n",
        DocumentKind::ActiveContext.title(),
        date
    )
}

pub fn progress(date: &str) -> String {
    format!(
        "# {}\n\n\
         ## Milestones\n\n\
         - [x] Memory bank initialized ({})\n\n\
         ## Updates\n",
        DocumentKind::Progress.title(),
        date
    )
}

/// Decision log with settled decisions under Technical Decisions and
/// proposed ones under Pending Decisions, each in input order
pub fn decision_log(decisions: &[DecisionRecord], today: &str) -> String {
    let (pending, settled): (Vec<_>, Vec<_>) =
        decisions.iter().partition(|d| d.status.is_pending());

    let render = |list: Vec<&DecisionRecord>, placeholder: &str| {
        if list.is_empty() {
            placeholder.to_string()
        } else {
            list.into_iter()
                .map(|d| decision_block(d, today))
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    };

    format!(
        "# {}\n\n## {}\n\n{}\n\n## {}\n\n{}\n",
        DocumentKind::DecisionLog.title(),
        TECHNICAL_DECISIONS,
        render(settled, NO_TECHNICAL_DECISIONS),
        PENDING_DECISIONS,
        render(pending, NO_PENDING_DECISIONS),
    )
}

/// Decisions recorded on initialization: one per detected framework, or a
/// single bootstrap decision when nothing was detected
pub fn initial_decisions(stack: &TechStack, date: &str) -> Vec<DecisionRecord> {
    if stack.frameworks.is_empty() {
        return vec![DecisionRecord {
            title: "Initialize memory bank".to_string(),
            description: "Track project context, progress and decisions in markdown documents."
                .to_string(),
            rationale: "Keeps project knowledge available across development sessions."
                .to_string(),
            status: DecisionStatus::Accepted,
            alternatives: None,
            impact: None,
            related_decisions: None,
            date: Some(date.to_string()),
        }];
    }

    stack
        .frameworks
        .iter()
        .map(|framework| DecisionRecord {
            title: format!("Use {}", framework),
            description: format!("The project builds on {}.", framework),
            rationale: "Declared in the project manifest dependencies.".to_string(),
            status: DecisionStatus::Accepted,
            alternatives: None,
            impact: None,
            related_decisions: None,
            date: Some(date.to_string()),
        })
        .collect()
}

/// Render one decision entry
pub fn decision_block(decision: &DecisionRecord, today: &str) -> String {
    let date = decision.date.as_deref().unwrap_or(today);
    let mut out = format!(
        "### {} ({})\n\n{}\n\n- **Status**: {}\n",
        inline_text(&decision.title),
        inline_text(date),
        block_text(&decision.description),
        decision.status
    );
    if let Some(impact) = &decision.impact {
        out.push_str(&format!("- **Impact**: {}\n", inline_text(impact)));
    }
    out.push_str(&format!(
        "- **Rationale**: {}\n",
        inline_text(&decision.rationale)
    ));

    let nested = [
        ("Alternatives Considered", &decision.alternatives),
        ("Related Decisions", &decision.related_decisions),
    ];
    for (label, items) in nested {
        if let Some(items) = items.as_ref().filter(|items| !items.is_empty()) {
            out.push_str(&format!("- **{}**:\n", label));
            out.push_str(&bullet_list(items, "  - "));
        }
    }

    out.trim_end().to_string()
}

/// Render one progress update under a `### <heading>` line
pub fn progress_block(snapshot: &ProgressSnapshot, heading: &str) -> String {
    let mut out = format!("### {}\n\n", heading);

    out.push_str("Completed:\n");
    out.push_str(&marker_list(&snapshot.completed, COMPLETED_MARKER));
    out.push_str("\nIn Progress:\n");
    out.push_str(&marker_list(&snapshot.in_progress, IN_PROGRESS_MARKER));

    let blocked = snapshot.blocked_items();
    if !blocked.is_empty() {
        out.push_str("\nBlocked:\n");
        out.push_str(&bullet_list(blocked, BLOCKED_MARKER));
    }

    out.trim_end().to_string()
}

/// Render one session update entry
pub fn session_block(update: &SessionUpdate) -> String {
    let session = &update.current_session;
    format!(
        "### Session Update ({})\n\n- **Mode**: {}\n- **Task**: {}",
        inline_text(&session.date),
        inline_text(&session.mode),
        inline_text(&session.task)
    )
}

fn push_joined<'a>(out: &mut String, label: &str, items: impl Iterator<Item = &'a String>) {
    let items: Vec<&str> = items.map(String::as_str).collect();
    if !items.is_empty() {
        out.push_str(&format!("- **{}**: {}\n", label, items.join(", ")));
    }
}

fn bullet_list(items: &[String], marker: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}\n", marker, inline_text(item)))
        .collect()
}

fn marker_list(items: &[String], marker: &str) -> String {
    if items.is_empty() {
        "- None\n".to_string()
    } else {
        bullet_list(items, marker)
    }
}
