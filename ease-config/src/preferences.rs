//! The flat preferences record shared by the session, the CLI and hosts.

use ease_babel::formats::markdown::parser::{LoadContext, RenderOptions};
use ease_babel::formats::markdown::style::{
    BulletMarker, HeadingStyle, NewlineStyle, OrderedMarker, StyleRules,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a newly inserted image ends up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageInsertRule {
    /// `assets/` next to the document, linked relatively.
    #[default]
    Assets,
    /// Linked by absolute path.
    Absolute,
    /// Uploaded through the configured command, linked by URL.
    Upload,
}

pub const MIN_CODE_INDENT_WIDTH: usize = 1;
pub const MAX_CODE_INDENT_WIDTH: usize = 8;

/// User preferences. Mirrors `defaults/ease.default.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub heading_style: HeadingStyle,
    pub bullet_marker: BulletMarker,
    pub ordered_marker: OrderedMarker,
    pub compact_whitespace: bool,
    pub smart_punctuation: bool,
    pub ascii_punctuation: bool,
    /// Render-time smart quotes and dashes.
    pub typographer: bool,
    pub soft_breaks_as_line_breaks: bool,
    pub linkify: bool,
    /// Spaces per tab, between [`MIN_CODE_INDENT_WIDTH`] and [`MAX_CODE_INDENT_WIDTH`].
    pub code_indent_width: usize,
    pub newline_style: NewlineStyle,
    pub image_insert_rule: ImageInsertRule,
    pub upload_command: String,
    pub autosave_drafts: bool,
    pub draft_delay_ms: u64,
    pub outline_delay_ms: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Keep,
            bullet_marker: BulletMarker::Keep,
            ordered_marker: OrderedMarker::Keep,
            compact_whitespace: false,
            smart_punctuation: false,
            ascii_punctuation: false,
            typographer: true,
            soft_breaks_as_line_breaks: true,
            linkify: true,
            code_indent_width: 2,
            newline_style: NewlineStyle::Lf,
            image_insert_rule: ImageInsertRule::Assets,
            upload_command: "picgo".to_string(),
            autosave_drafts: true,
            draft_delay_ms: 600,
            outline_delay_ms: 200,
        }
    }
}

/// Overwrite `target` with `object[key]` when it deserializes and passes
/// `valid`; otherwise keep the current value.
fn merge_field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    target: &mut T,
    valid: impl Fn(&T) -> bool,
) {
    let Some(raw) = object.get(key) else {
        return;
    };
    match serde_json::from_value::<T>(raw.clone()) {
        Ok(value) if valid(&value) => *target = value,
        Ok(_) => tracing::debug!(key, %raw, "preference out of range, using default"),
        Err(e) => tracing::debug!(key, %raw, "invalid preference, using default: {e}"),
    }
}

fn any<T>(_: &T) -> bool {
    true
}

impl Preferences {
    /// Parse a stored record. Never fails: unreadable text gives the defaults.
    pub fn from_json_lenient(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value_lenient(&value),
            Err(e) => {
                tracing::warn!("preferences record is not JSON, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Build preferences field by field. Unknown keys are ignored and each
    /// missing or invalid field keeps its default.
    pub fn from_value_lenient(value: &Value) -> Self {
        let mut prefs = Self::default();
        let Some(object) = value.as_object() else {
            tracing::warn!("preferences record is not an object, using defaults");
            return prefs;
        };

        merge_field(object, "heading_style", &mut prefs.heading_style, any);
        merge_field(object, "bullet_marker", &mut prefs.bullet_marker, any);
        merge_field(object, "ordered_marker", &mut prefs.ordered_marker, any);
        merge_field(object, "compact_whitespace", &mut prefs.compact_whitespace, any);
        merge_field(object, "smart_punctuation", &mut prefs.smart_punctuation, any);
        merge_field(object, "ascii_punctuation", &mut prefs.ascii_punctuation, any);
        merge_field(object, "typographer", &mut prefs.typographer, any);
        merge_field(
            object,
            "soft_breaks_as_line_breaks",
            &mut prefs.soft_breaks_as_line_breaks,
            any,
        );
        merge_field(object, "linkify", &mut prefs.linkify, any);
        merge_field(
            object,
            "code_indent_width",
            &mut prefs.code_indent_width,
            |width| (MIN_CODE_INDENT_WIDTH..=MAX_CODE_INDENT_WIDTH).contains(width),
        );
        merge_field(object, "newline_style", &mut prefs.newline_style, any);
        merge_field(object, "image_insert_rule", &mut prefs.image_insert_rule, any);
        merge_field(object, "upload_command", &mut prefs.upload_command, |cmd: &String| {
            !cmd.trim().is_empty()
        });
        merge_field(object, "autosave_drafts", &mut prefs.autosave_drafts, any);
        merge_field(object, "draft_delay_ms", &mut prefs.draft_delay_ms, any);
        merge_field(object, "outline_delay_ms", &mut prefs.outline_delay_ms, any);
        prefs
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<&Preferences> for RenderOptions {
    fn from(prefs: &Preferences) -> Self {
        RenderOptions {
            typographer: prefs.typographer,
            soft_breaks_as_line_breaks: prefs.soft_breaks_as_line_breaks,
            linkify: prefs.linkify,
        }
    }
}

impl From<&Preferences> for StyleRules {
    fn from(prefs: &Preferences) -> Self {
        StyleRules {
            heading_style: prefs.heading_style,
            bullet_marker: prefs.bullet_marker,
            ordered_marker: prefs.ordered_marker,
            compact_whitespace: prefs.compact_whitespace,
            smart_punctuation: prefs.smart_punctuation,
            ascii_punctuation: prefs.ascii_punctuation,
        }
    }
}

/// Load context without a document path; callers set it per document.
impl From<&Preferences> for LoadContext {
    fn from(prefs: &Preferences) -> Self {
        LoadContext {
            document_path: None,
            tab_width: prefs.code_indent_width,
            render: prefs.into(),
        }
    }
}
