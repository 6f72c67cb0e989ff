// Navigation summary

use serde::Serialize;
use std::fmt;

/// Spaces of indentation per nesting level
pub const INDENT_WIDTH: usize = 4;

/// One line of the navigation index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub label: String,
    /// Page path relative to the output root; `None` for directory headings
    pub link: Option<String>,
    pub depth: usize,
}

impl SummaryEntry {
    pub fn page(label: impl Into<String>, link: impl Into<String>, depth: usize) -> Self {
        Self {
            label: label.into(),
            link: Some(link.into()),
            depth,
        }
    }

    pub fn heading(label: impl Into<String>, depth: usize) -> Self {
        Self {
            label: label.into(),
            link: None,
            depth,
        }
    }
}

impl fmt::Display for SummaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}* [{}]({})",
            "",
            self.label,
            self.link.as_deref().unwrap_or(""),
            indent = self.depth * INDENT_WIDTH
        )
    }
}

/// Render the whole index, one entry per line
pub fn render_summary(entries: &[SummaryEntry]) -> String {
    let mut text = entries
        .iter()
        .map(SummaryEntry::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}
