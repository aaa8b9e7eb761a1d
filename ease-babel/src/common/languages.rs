//! Code-block languages and syntax highlighting
//!
//! Recognized languages are the tokens of syntect's bundled syntax set (file
//! extensions and single-word syntax names, lowercased). Anything else is
//! classified as `plaintext`.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Neutral classification for untagged or unrecognized code.
pub const PLAINTEXT: &str = "plaintext";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static LANGUAGES: Lazy<Vec<String>> = Lazy::new(|| {
    let mut tokens: Vec<String> = SYNTAX_SET
        .syntaxes()
        .iter()
        .filter(|syntax| !is_plain_text(syntax))
        .flat_map(|syntax| {
            let mut names: Vec<String> = syntax
                .file_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect();
            if !syntax.name.contains(char::is_whitespace) {
                names.push(syntax.name.to_lowercase());
            }
            names
        })
        .filter(|token| !token.is_empty() && token.as_str() != PLAINTEXT)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens.insert(0, PLAINTEXT.to_string());
    tokens
});

fn is_plain_text(syntax: &SyntaxReference) -> bool {
    syntax.name == "Plain Text"
}

fn lookup(language: &str) -> Option<&'static SyntaxReference> {
    let token = language.trim();
    if token.is_empty() || token.eq_ignore_ascii_case(PLAINTEXT) {
        return None;
    }
    SYNTAX_SET
        .find_syntax_by_token(token)
        .filter(|syntax| !is_plain_text(syntax))
}

/// `plaintext` followed by every recognized language token, sorted.
pub fn supported_languages() -> &'static [String] {
    &LANGUAGES
}

pub fn is_supported(language: &str) -> bool {
    lookup(language).is_some()
}

/// Lowercased language token if recognized, otherwise `plaintext`.
pub fn normalize_code_language(value: &str) -> String {
    let token = value.trim().to_lowercase();
    if lookup(&token).is_some() {
        token
    } else {
        PLAINTEXT.to_string()
    }
}

/// Language of a fence info string: its first word, lowercased.
pub fn info_string_language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .map(str::to_lowercase)
        .filter(|lang| !lang.is_empty())
}

/// Highlight `code` as `language`, returning `hljs-` classed spans.
///
/// `None` when the language is not recognized or highlighting fails; callers
/// fall back to escaped plain text.
pub fn highlight(language: &str, code: &str) -> Option<String> {
    let syntax = lookup(language)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAX_SET,
        ClassStyle::SpacedPrefixed { prefix: "hljs-" },
    );
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(language, "syntax highlighting failed: {e}");
            return None;
        }
    }
    Some(generator.finalize())
}
