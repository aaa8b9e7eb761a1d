//! External image uploader (PicGo-compatible command line).
//!
//! The command is run as `<command> upload <image>`. Uploaders differ in how
//! they report the result, so the URL is looked for in JSON output first and
//! then anywhere in the combined text.

use crate::error::{Result, SessionError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).unwrap());

/// 1x1 transparent PNG used to check an uploader end to end.
pub const PROBE_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub url: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl UploadResult {
    /// stdout and stderr joined, for error display.
    pub fn merged_output(&self) -> String {
        let parts: Vec<&str> = [self.stdout.trim(), self.stderr.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();
        parts.join("\n")
    }
}

pub fn extract_first_url(text: &str) -> Option<String> {
    URL.find(text).map(|m| m.as_str().to_string())
}

/// `result[0]` or `url` of a JSON object.
pub fn extract_url_from_json_text(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text.trim()).ok()?;
    if let Some(first) = value
        .get("result")
        .and_then(Value::as_array)
        .and_then(|items| items.iter().find_map(Value::as_str))
    {
        return Some(first.to_string());
    }
    value.get("url").and_then(Value::as_str).map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct ImageUploader {
    command: String,
}

impl ImageUploader {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn run(&self, args: &[&std::ffi::OsStr]) -> Result<std::process::Output> {
        Command::new(&self.command)
            .args(args)
            .output()
            .map_err(|e| SessionError::Upload(format!("cannot run {}: {e}", self.command)))
    }

    pub fn upload(&self, image: &Path) -> Result<UploadResult> {
        let output = self.run(&["upload".as_ref(), image.as_os_str()])?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let merged = format!("{stdout}\n{stderr}");
        let url = extract_url_from_json_text(&stdout)
            .or_else(|| extract_first_url(&merged))
            .or_else(|| extract_url_from_json_text(&stderr));
        tracing::debug!(command = %self.command, success = output.status.success(), ?url, "upload finished");
        Ok(UploadResult {
            success: output.status.success(),
            url,
            stdout,
            stderr,
        })
    }

    /// Check the uploader is installed; returns its version text.
    pub fn validate(&self) -> Result<String> {
        let output = self.run(&["--version".as_ref()])?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if output.status.success() {
            return Ok(if stdout.is_empty() {
                format!("{} detected", self.command)
            } else {
                stdout
            });
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(SessionError::Upload(if stderr.is_empty() {
            format!("{} validate failed", self.command)
        } else {
            stderr
        }))
    }

    /// Upload [`PROBE_PNG`] from a temporary file.
    pub fn validate_upload(&self, scratch_dir: &Path) -> Result<UploadResult> {
        let probe = scratch_dir.join("ease-md-upload-probe.png");
        std::fs::write(&probe, PROBE_PNG).map_err(|e| SessionError::io(&probe, e))?;
        let result = self.upload(&probe);
        if let Err(e) = std::fs::remove_file(&probe) {
            tracing::warn!(path = %probe.display(), "cannot remove probe image: {e}");
        }
        result
    }
}
