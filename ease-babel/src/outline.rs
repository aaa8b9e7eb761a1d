//! Outline extraction
//!
//! Headings of either the structured document (rich view) or the raw source
//! (source view), each with a locator the host can scroll to.

use crate::document::{Document, Node, NodePath};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const UNTITLED: &str = "Untitled";

/// Where an outline entry lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// Heading node in the structured document.
    Node(NodePath),
    /// Zero-based line in the source text.
    Line(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub locator: Locator,
}

impl OutlineEntry {
    fn new(level: u8, text: &str, locator: Locator) -> Self {
        let text = text.trim();
        Self {
            level,
            text: if text.is_empty() { UNTITLED } else { text }.to_string(),
            locator,
        }
    }
}

/// Headings of a document in document order, nested ones included.
pub fn from_document(doc: &Document) -> Vec<OutlineEntry> {
    doc.descendants()
        .into_iter()
        .filter_map(|(path, node)| match node {
            Node::Heading { level, .. } => Some(OutlineEntry::new(
                *level,
                &node.text_content(),
                Locator::Node(path),
            )),
            _ => None,
        })
        .collect()
}

static ATX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static CLOSING_HASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s+)#+\s*$").unwrap());
static FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(`{3,}|~{3,})").unwrap());

/// ATX headings of raw Markdown, skipping fenced code.
pub fn from_source(text: &str) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut fence: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        if let Some(run) = FENCE.captures(line).map(|caps| caps[1].to_string()) {
            match &fence {
                None => fence = Some(run),
                Some(open)
                    if run.starts_with(&open[..1])
                        && run.len() >= open.len()
                        && line.trim() == run =>
                {
                    fence = None
                }
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }
        if let Some(caps) = ATX.captures(line) {
            let title = CLOSING_HASHES.replace(&caps[2], "");
            entries.push(OutlineEntry::new(
                caps[1].len() as u8,
                &title,
                Locator::Line(index),
            ));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels_and_text(entries: &[OutlineEntry]) -> Vec<(u8, &str)> {
        entries.iter().map(|e| (e.level, e.text.as_str())).collect()
    }

    #[test]
    fn source_headings() {
        let entries = from_source("# Title\n\ntext\n## Sub\n");
        assert_eq!(levels_and_text(&entries), vec![(1, "Title"), (2, "Sub")]);
        assert_eq!(entries[1].locator, Locator::Line(3));
    }

    #[test]
    fn closing_hashes_and_empty_titles() {
        let entries = from_source("## Title ##\n#   \n####### seven\n#nospace\n");
        assert_eq!(
            levels_and_text(&entries),
            vec![(2, "Title"), (1, "Untitled")]
        );
    }

    #[test]
    fn heading_like_lines_inside_fences_are_ignored() {
        let text = "# Real\n```sh\n# comment\n```\n~~~~\n## also code\n~~~\n~~~~\n## After\n";
        let entries = from_source(text);
        assert_eq!(levels_and_text(&entries), vec![(1, "Real"), (2, "After")]);
    }

    #[test]
    fn document_headings_include_nested() {
        let doc = Document::new(vec![
            Node::heading(1, vec![Node::text("Top")]),
            Node::Blockquote {
                children: vec![Node::heading(3, vec![Node::text("Quoted")])],
            },
            Node::heading(2, vec![]),
        ]);
        let entries = from_document(&doc);
        assert_eq!(
            levels_and_text(&entries),
            vec![(1, "Top"), (3, "Quoted"), (2, "Untitled")]
        );
        assert_eq!(entries[1].locator, Locator::Node(NodePath(vec![1, 0])));
    }
}
