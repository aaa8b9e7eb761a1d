//! Image reference resolution
//!
//! Markdown keeps image sources the way the author wrote them (usually a path
//! relative to the document). The rich view needs something it can load
//! directly, so local files are read and inlined as `data:` URIs. The reverse
//! direction is never computed: the raw value travels alongside the display
//! value (`data-original` in HTML, `Image::original` in the document).

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use url::Url;

static SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());
static DRIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:/").unwrap());
static IMAGE_MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)$").unwrap());

/// Values handed to the display surface untouched.
const PASSTHROUGH_PREFIXES: &[&str] = &["http:", "https:", "data:", "blob:"];

fn normalize_separators(raw: &str) -> String {
    raw.trim().replace('\\', "/")
}

/// Whether `raw` is already loadable as-is: web URLs, `data:`/`blob:` values
/// and any other `scheme://` reference (`tauri://`, `asset://`...).
pub fn is_passthrough(raw: &str) -> bool {
    let normalized = normalize_separators(raw);
    let lower = normalized.to_ascii_lowercase();
    if PASSTHROUGH_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    SCHEME.is_match(&normalized) && !lower.starts_with("file://")
}

fn is_absolute(normalized: &str) -> bool {
    normalized.starts_with('/') || DRIVE.is_match(normalized)
}

/// The file on disk an image source refers to.
///
/// `None` for URLs and other schemes, and for relative sources when there is
/// no document to resolve them against.
pub fn resolve_file_path(raw: &str, document_path: Option<&Path>) -> Option<PathBuf> {
    let normalized = normalize_separators(raw);
    if normalized.is_empty() || is_passthrough(&normalized) {
        return None;
    }
    if normalized.to_ascii_lowercase().starts_with("file://") {
        return Url::parse(&normalized).ok()?.to_file_path().ok();
    }
    if is_absolute(&normalized) {
        return Some(PathBuf::from(normalized));
    }

    let dir = document_path?.parent()?;
    let dir = std::path::absolute(dir).ok()?;
    let base = Url::from_directory_path(&dir).ok()?;
    base.join(&normalized).ok()?.to_file_path().ok()
}

/// Display form of an image source.
///
/// Remote and already-resolved values pass through byte-identical. Local files
/// are read and returned as a `data:` URI. Any failure returns `raw` unchanged.
pub fn resolve(raw: &str, document_path: Option<&Path>) -> String {
    if raw.trim().is_empty() || is_passthrough(raw) {
        return raw.to_string();
    }
    let Some(path) = resolve_file_path(raw, document_path) else {
        return raw.to_string();
    };
    match std::fs::read(&path) {
        Ok(bytes) => data_uri(&bytes, mime_for_path(&path)),
        Err(e) => {
            tracing::debug!(path = %path.display(), "image not loadable: {e}");
            raw.to_string()
        }
    }
}

pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// MIME type by file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Rewrite every `<img>` in `html` to its display form.
///
/// Images whose display value differs from the raw `src` get the display value
/// in `src` and the raw value in `data-original`.
pub fn decorate_images(html: &str, document_path: Option<&Path>) -> String {
    super::dom::rewrite_body(html, |body| {
        super::dom::walk(body, &mut |node, _| {
            if !super::dom::is_element(node, "img") {
                return;
            }
            let Some(raw) = super::dom::attr(node, "src") else {
                return;
            };
            let display = resolve(&raw, document_path);
            if display != raw {
                super::dom::set_attr(node, "src", &display);
                super::dom::set_attr(node, "data-original", &raw);
            }
        });
    })
}

/// `![alt](src)`
pub fn format_image_markdown(src: &str, alt: &str) -> String {
    format!("![{alt}]({src})")
}

/// A single parsed `![alt](src)` snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMarkdown {
    pub alt: String,
    pub src: String,
}

/// Parse text consisting of exactly one image reference.
pub fn parse_image_markdown(text: &str) -> Option<ImageMarkdown> {
    let caps = IMAGE_MARKDOWN.captures(text.trim())?;
    let src = caps[2].trim();
    if src.is_empty() {
        return None;
    }
    Some(ImageMarkdown {
        alt: caps[1].to_string(),
        src: src.to_string(),
    })
}

/// How a file at `target` should be written in Markdown: relative to the
/// document's directory when there is a document, absolute otherwise.
pub fn link_path(target: &Path, document_path: Option<&Path>) -> String {
    let relative = document_path
        .and_then(Path::parent)
        .and_then(|dir| pathdiff::diff_paths(target, dir));
    let path = relative.unwrap_or_else(|| target.to_path_buf());
    path.to_string_lossy().replace('\\', "/")
}
