//! Folder tree of Markdown documents.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

fn read_dir_sorted(dir: &Path) -> Vec<(String, PathBuf, bool)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), "cannot read directory: {e}");
            return Vec::new();
        }
    };
    let mut out: Vec<(String, PathBuf, bool)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            let is_dir = path.is_dir();
            (entry.file_name().to_string_lossy().into_owned(), path, is_dir)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Markdown files under `base`, recursively. Directories are kept when they
/// contain Markdown somewhere below them or are listed in `created_dirs`.
/// Directories sort before files, then by name.
pub fn scan_tree(base: &Path, created_dirs: &BTreeSet<PathBuf>) -> Vec<TreeEntry> {
    let mut entries = Vec::new();
    for (name, path, is_dir) in read_dir_sorted(base) {
        if is_dir {
            let children = scan_tree(&path, created_dirs);
            if !children.is_empty() || created_dirs.contains(&path) {
                entries.push(TreeEntry {
                    name,
                    path,
                    kind: EntryKind::Directory,
                    children,
                });
            }
        } else if is_markdown_file(&path) {
            entries.push(TreeEntry {
                name,
                path,
                kind: EntryKind::File,
                children: Vec::new(),
            });
        }
    }
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Every Markdown file under `base` as a flat list sorted by file name.
pub fn scan_markdown_files(base: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_markdown_files(base, &mut files);
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    files
}

fn collect_markdown_files(dir: &Path, out: &mut Vec<PathBuf>) {
    for (_, path, is_dir) in read_dir_sorted(dir) {
        if is_dir {
            collect_markdown_files(&path, out);
        } else if is_markdown_file(&path) {
            out.push(path);
        }
    }
}
