//! Where inserted images are written and how they are linked.

use crate::error::{Result, SessionError};
use ease_babel::common::images::link_path;
use std::path::{Path, PathBuf};

pub const ASSETS_DIR: &str = "assets";
const FALLBACK_SUBDIR: &str = "EaseMD";
const DEFAULT_EXTENSION: &str = "png";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Image files accepted from drops.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// `<Pictures>/EaseMD`, used for images of untitled documents.
pub fn default_fallback_dir() -> Option<PathBuf> {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .map(|dir| dir.join(FALLBACK_SUBDIR))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    /// File to write.
    pub file: PathBuf,
    /// Value to put in the Markdown source.
    pub link: String,
}

fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        ext
    }
}

fn file_name(extension: &str, attempt: u32) -> String {
    let now = chrono::Utc::now();
    let suffix = (now.timestamp_subsec_nanos() / 1_000 + attempt) & 0xffff;
    format!("image-{}-{suffix:04x}.{extension}", now.timestamp_millis())
}

/// Pick a fresh file for an inserted image and create its directory.
///
/// Saved documents get `assets/image-<millis>-<hex4>.<ext>` next to them,
/// linked relatively. Untitled documents use `fallback_dir`, linked by
/// absolute path.
pub fn resolve_image_target(
    extension: &str,
    document_path: Option<&Path>,
    fallback_dir: Option<&Path>,
) -> Result<ImageTarget> {
    let extension = normalize_extension(extension);
    let dir = match document_path.and_then(Path::parent) {
        Some(parent) => parent.join(ASSETS_DIR),
        None => fallback_dir.ok_or(SessionError::NoPath)?.to_path_buf(),
    };
    std::fs::create_dir_all(&dir).map_err(|e| SessionError::io(&dir, e))?;

    let mut attempt = 0;
    let file = loop {
        let candidate = dir.join(file_name(&extension, attempt));
        if !candidate.exists() {
            break candidate;
        }
        attempt += 1;
    };
    let link = link_path(&file, document_path);
    Ok(ImageTarget { file, link })
}
