//! Structured markdown document model
//!
//! A document is a preamble (the `# Title` line and anything before the
//! first level-2 heading) followed by an ordered list of [`Section`]s, each
//! opened by a `## ` heading line. Headings inside fenced code blocks are
//! body text. Rendering a parsed document reproduces the input exactly, so
//! editing one section never disturbs the bytes of another.

pub mod editor;

/// A level-2 heading and the text up to the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    heading_line: String,
    pub body: String,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            heading_line: format!("## {}\n", title),
            body: String::new(),
        }
    }

    /// Heading text without the `## ` marker
    pub fn title(&self) -> &str {
        self.heading_line
            .trim_end_matches(['\r', '\n'])
            .strip_prefix("##")
            .unwrap_or_default()
            .trim()
    }

    /// Append a markdown block to the end of the body, separated from
    /// existing content and from the next heading by a blank line
    pub fn append_block(&mut self, block: &str) {
        if !self.heading_line.ends_with('\n') {
            self.heading_line.push('\n');
        }
        if self.body.trim().is_empty() {
            self.body = "\n".to_string();
        } else {
            ensure_blank_line(&mut self.body);
        }
        self.body.push_str(block.trim_end_matches('\n'));
        self.body.push_str("\n\n");
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.heading_line);
        out.push_str(&self.body);
    }
}

/// Parsed markdown document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkdownDocument {
    pub preamble: String,
    pub sections: Vec<Section>,
}

impl MarkdownDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = MarkdownDocument::default();
        let mut in_fence = false;

        for line in text.split_inclusive('\n') {
            if is_fence(line) {
                in_fence = !in_fence;
            } else if !in_fence && is_section_heading(line) {
                doc.sections.push(Section {
                    heading_line: line.to_string(),
                    body: String::new(),
                });
                continue;
            }

            match doc.sections.last_mut() {
                Some(section) => section.body.push_str(line),
                None => doc.preamble.push_str(line),
            }
        }

        doc
    }

    pub fn render(&self) -> String {
        let mut out = self.preamble.clone();
        for section in &self.sections {
            section.render_into(&mut out);
        }
        out
    }

    /// Text of the leading `# ` heading, if any
    pub fn title(&self) -> Option<&str> {
        self.preamble
            .lines()
            .find_map(|line| line.strip_prefix("# "))
            .map(str::trim)
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title() == title)
    }

    pub fn section_mut(&mut self, title: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.title() == title)
    }

    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(Section::title).collect()
    }
}

fn is_section_heading(line: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    line == "##" || line.starts_with("## ")
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Collapse caller text onto one line, for headings, list items and
/// `- **Label**: value` fields
pub fn inline_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Caller text that can sit inside a section body without changing the
/// document structure: headings outside fences are escaped and an unclosed
/// fence is closed.
pub fn block_text(text: &str) -> String {
    let mut in_fence = false;
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            lines.push(line.to_string());
        } else if !in_fence && line.trim_start().starts_with('#') {
            let indent = line.len() - line.trim_start().len();
            lines.push(format!("{}\\{}", &line[..indent], &line[indent..]));
        } else {
            lines.push(line.to_string());
        }
    }
    if in_fence {
        lines.push("```".to_string());
    }

    lines.join("\n")
}

/// Make sure `text` ends with an empty line
pub(crate) fn ensure_blank_line(text: &mut String) {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    if !text.ends_with("\n\n") {
        text.push('\n');
    }
}

/// Append a block at the very end of a document. The result is always
/// longer than the input, whatever the input looks like.
pub fn append_to_end(text: &str, block: &str) -> String {
    let mut out = text.to_string();
    if !out.is_empty() {
        ensure_blank_line(&mut out);
    }
    out.push_str(block.trim_end_matches('\n'));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Decision Log\n\nIntro line\n\n## Technical Decisions\n\n### A (2024-01-01)\n\nBody\n\n## Pending Decisions\n\n_No pending decisions._\n";

    #[test]
    fn test_parse_sections() {
        let doc = MarkdownDocument::parse(SAMPLE);
        assert_eq!(doc.title(), Some("Decision Log"));
        assert_eq!(
            doc.section_titles(),
            vec!["Technical Decisions", "Pending Decisions"]
        );
        assert!(doc
            .section("Technical Decisions")
            .unwrap()
            .body
            .contains("### A (2024-01-01)"));
    }

    #[test]
    fn test_render_is_exact() {
        for text in [
            SAMPLE,
            "",
            "no headings at all",
            "## Only\nno trailing newline",
            "# T\r\n\r\n## Windows\r\nline\r\n",
        ] {
            assert_eq!(MarkdownDocument::parse(text).render(), text);
        }
    }

    #[test]
    fn test_subheadings_and_fences_are_body() {
        let text = "# T\n\n## Real\n\n### Sub\n\n```md\n## Not a section\n```\n";
        let doc = MarkdownDocument::parse(text);
        assert_eq!(doc.section_titles(), vec!["Real"]);
        assert!(doc.section("Real").unwrap().body.contains("## Not a section"));
    }

    #[test]
    fn test_append_block_keeps_spacing() {
        let mut doc = MarkdownDocument::parse(SAMPLE);
        doc.section_mut("Technical Decisions")
            .unwrap()
            .append_block("### B (2024-02-02)\n\nMore");

        let rendered = doc.render();
        assert!(rendered.contains("Body\n\n### B (2024-02-02)\n\nMore\n\n## Pending Decisions"));
        assert!(rendered.ends_with("_No pending decisions._\n"));
    }

    #[test]
    fn test_append_block_to_last_section_without_newline() {
        let mut doc = MarkdownDocument::parse("# T\n\n## Last");
        doc.section_mut("Last").unwrap().append_block("entry");
        assert_eq!(doc.render(), "# T\n\n## Last\n\nentry\n\n");
    }

    #[test]
    fn test_inline_text_flattens_lines() {
        assert_eq!(inline_text("Use Rust"), "Use Rust");
        assert_eq!(inline_text("  first\n\n## second \r\n```"), "first ## second ```");
        assert_eq!(inline_text(""), "");
    }

    #[test]
    fn test_block_text_escapes_headings() {
        assert_eq!(
            block_text("Intro\n\n## Details\n  # Title\ntail"),
            "Intro\n\n\\## Details\n  \\# Title\ntail"
        );
        assert_eq!(block_text("plain text"), "plain text");
    }

    #[test]
    fn test_block_text_keeps_balanced_fences() {
        let text = "Example:\n```md\n## inside\n```\nafter";
        assert_eq!(block_text(text), text);
    }

    #[test]
    fn test_block_text_closes_open_fence() {
        assert_eq!(
            block_text("Example:\n```\nlet x = 1;"),
            "Example:\n```\nlet x = 1;\n```"
        );
        assert_eq!(block_text("~~~"), "~~~\n```");
    }

    #[test]
    fn test_block_text_cannot_open_sections() {
        let body = block_text("a\n## Pending Decisions\n```\n## Technical Decisions");
        let text = format!("# Log\n\n## Only\n\n{}\n\n## Last\n", body);
        let doc = MarkdownDocument::parse(&text);
        assert_eq!(doc.section_titles(), vec!["Only", "Last"]);
    }

    #[test]
    fn test_append_to_end() {
        assert_eq!(append_to_end("# T\n", "block\n"), "# T\n\nblock\n");
        assert_eq!(append_to_end("# T", "block"), "# T\n\nblock\n");
        assert_eq!(append_to_end("", "block"), "block\n");
        let text = "x\n\n\n\n";
        assert!(append_to_end(text, "b").len() > text.len());
    }
}
