//! Section editor: applies updates to document text
//!
//! Session and progress updates go at the end of the document. Decisions
//! are spliced into their status section and every other section is left
//! byte-for-byte intact.

use super::{append_to_end, MarkdownDocument};
use crate::error::{MemoryBankError, Result};
use crate::templates::{
    self, NO_PENDING_DECISIONS, NO_TECHNICAL_DECISIONS, PENDING_DECISIONS, TECHNICAL_DECISIONS,
};
use crate::types::{DecisionRecord, DocumentKind, ProgressSnapshot, SessionUpdate};

/// Append a dated session update to the active context
pub fn merge_active_context(text: &str, update: &SessionUpdate) -> String {
    append_to_end(text, &templates::session_block(update))
}

/// Section a decision with this status belongs to
pub fn decision_section(decision: &DecisionRecord) -> &'static str {
    if decision.status.is_pending() {
        PENDING_DECISIONS
    } else {
        TECHNICAL_DECISIONS
    }
}

/// Append a decision to the end of its status section
pub fn append_decision(text: &str, decision: &DecisionRecord, today: &str) -> Result<String> {
    let target = decision_section(decision);
    let mut doc = MarkdownDocument::parse(text);

    let section = doc
        .section_mut(target)
        .ok_or_else(|| MemoryBankError::SectionNotFound {
            section: target.to_string(),
            document: DocumentKind::DecisionLog.file_name().to_string(),
        })?;

    let current = section.body.trim();
    if current == NO_PENDING_DECISIONS || current == NO_TECHNICAL_DECISIONS {
        section.body.clear();
    }
    section.append_block(&templates::decision_block(decision, today));

    Ok(doc.render())
}

/// Append a progress block at the end of the progress document
pub fn append_progress(text: &str, snapshot: &ProgressSnapshot, heading: &str) -> String {
    append_to_end(text, &templates::progress_block(snapshot, heading))
}
