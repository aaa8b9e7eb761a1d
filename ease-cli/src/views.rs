//! Plain-text views for the `outline` and `tree` commands
//!
//! JSON output goes straight through serde; these are the human-readable
//! forms, indented two spaces per level.

use ease_babel::OutlineEntry;
use ease_session::tree::EntryKind;
use ease_session::TreeEntry;

/// One heading per line, indented by level.
pub fn outline_text(entries: &[OutlineEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let depth = usize::from(entry.level.saturating_sub(1));
        out.push_str(&"  ".repeat(depth));
        out.push_str(&entry.text);
        out.push('\n');
    }
    out
}

/// Directories end with `/`; their children follow, one level deeper.
pub fn tree_text(entries: &[TreeEntry]) -> String {
    let mut out = String::new();
    write_tree(entries, 0, &mut out);
    out
}

fn write_tree(entries: &[TreeEntry], depth: usize, out: &mut String) {
    for entry in entries {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&entry.name);
        if entry.kind == EntryKind::Directory {
            out.push('/');
        }
        out.push('\n');
        write_tree(&entry.children, depth + 1, out);
    }
}
