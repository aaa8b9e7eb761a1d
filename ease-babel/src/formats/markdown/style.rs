//! Markdown style normalization
//!
//! Text-to-text passes applied to serialized Markdown, each independently
//! switchable through [`StyleRules`]. They run in a fixed order:
//!
//! 1. full-width / CJK punctuation → ASCII
//! 2. smart punctuation (curly quotes, dashes, ellipsis)
//! 3. whitespace compaction
//! 4. heading style (ATX ⇄ Setext)
//! 5. list markers
//!
//! No pass touches a fenced code block: the fence lines and everything between
//! them are copied through unchanged. Every pass is idempotent, and so is
//! [`normalize`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    #[default]
    Keep,
    /// `# Title`
    Atx,
    /// `Title` underlined with `===` / `---` (levels 1 and 2 only)
    Setext,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletMarker {
    #[default]
    Keep,
    Dash,
    Asterisk,
    Plus,
}

impl BulletMarker {
    pub fn as_char(&self) -> Option<char> {
        match self {
            BulletMarker::Keep => None,
            BulletMarker::Dash => Some('-'),
            BulletMarker::Asterisk => Some('*'),
            BulletMarker::Plus => Some('+'),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderedMarker {
    #[default]
    Keep,
    /// `1.`
    Period,
    /// `1)`
    Paren,
}

impl OrderedMarker {
    pub fn as_char(&self) -> Option<char> {
        match self {
            OrderedMarker::Keep => None,
            OrderedMarker::Period => Some('.'),
            OrderedMarker::Paren => Some(')'),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineStyle {
    #[default]
    Lf,
    Crlf,
}

/// Which normalization passes run, and their targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRules {
    pub heading_style: HeadingStyle,
    pub bullet_marker: BulletMarker,
    pub ordered_marker: OrderedMarker,
    /// Collapse interior runs of spaces and tabs.
    pub compact_whitespace: bool,
    /// Curly quotes, en/em dashes and ellipses.
    pub smart_punctuation: bool,
    /// Map full-width and CJK punctuation to ASCII.
    pub ascii_punctuation: bool,
}

/// Convert every line ending to `style`.
pub fn apply_newline_style(text: &str, style: NewlineStyle) -> String {
    let unix = text.replace("\r\n", "\n");
    match style {
        NewlineStyle::Lf => unix,
        NewlineStyle::Crlf => unix.replace('\n', "\r\n"),
    }
}

/// Apply every enabled pass to `markdown`. Output uses `\n` line endings.
pub fn normalize(markdown: &str, rules: &StyleRules) -> String {
    let mut lines: Vec<String> = markdown
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::to_string)
        .collect();

    if rules.ascii_punctuation {
        let kinds = classify(&lines);
        for (line, kind) in lines.iter_mut().zip(&kinds) {
            if !kind.is_fenced() {
                *line = ascii_punctuation(line);
            }
        }
    }

    let kinds = classify(&lines);
    if rules.smart_punctuation {
        for (line, kind) in lines.iter_mut().zip(&kinds) {
            if *kind == LineKind::Text && !is_punctuation_exempt(line) {
                *line = smart_punctuation(line);
            }
        }
    }
    if rules.compact_whitespace {
        for (line, kind) in lines.iter_mut().zip(&kinds) {
            if *kind == LineKind::Text {
                *line = compact_whitespace(line);
            }
        }
    }

    match rules.heading_style {
        HeadingStyle::Keep => {}
        HeadingStyle::Atx => lines = setext_to_atx(lines),
        HeadingStyle::Setext => lines = atx_to_setext(lines),
    }

    if rules.bullet_marker != BulletMarker::Keep || rules.ordered_marker != OrderedMarker::Keep {
        let kinds = classify(&lines);
        for (line, kind) in lines.iter_mut().zip(&kinds) {
            if *kind == LineKind::Text {
                *line = list_marker(line, rules.bullet_marker, rules.ordered_marker);
            }
        }
    }

    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Text,
    /// An opening or closing fence line.
    Fence,
    /// Content between fences.
    InFence,
    /// Indented code block content.
    Indented,
}

impl LineKind {
    fn is_fenced(&self) -> bool {
        matches!(self, LineKind::Fence | LineKind::InFence)
    }
}

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)*[ \t]*(`{3,}|~{3,})(.*)$").unwrap());
static FENCE_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)*[ \t]*(`{3,}|~{3,})[ \t]*$").unwrap());
static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:>[ \t]?)*[ \t]*(?:[-*+]|\d{1,9}[.)])(?:[ \t]|$)").unwrap());

fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Classify each line as fence, fenced content, indented code or text.
///
/// A fence opens with three or more backticks or tildes and closes with the
/// same character repeated at least as many times.
fn classify(lines: &[String]) -> Vec<LineKind> {
    let mut kinds = Vec::with_capacity(lines.len());
    let mut open: Option<(char, usize)> = None;
    let mut in_list = false;
    let mut previous = LineKind::Text;
    let mut previous_blank = true;

    for line in lines {
        let kind = if let Some((fence_char, fence_len)) = open {
            let closes = FENCE_CLOSE.captures(line).is_some_and(|caps| {
                let run = &caps[1];
                run.starts_with(fence_char) && run.len() >= fence_len
            });
            if closes {
                open = None;
                LineKind::Fence
            } else {
                LineKind::InFence
            }
        } else if let Some(caps) = FENCE_OPEN
            .captures(line)
            .filter(|caps| !(caps[1].starts_with('`') && caps[2].contains('`')))
        {
            let run = &caps[1];
            open = run.chars().next().map(|c| (c, run.len()));
            LineKind::Fence
        } else if !in_list
            && indentation(line) >= 4
            && !is_blank(line)
            && (previous_blank || previous == LineKind::Indented)
        {
            LineKind::Indented
        } else {
            LineKind::Text
        };

        if kind == LineKind::Text && !is_blank(line) {
            if LIST_ITEM.is_match(line) {
                in_list = true;
            } else if indentation(line) == 0 {
                in_list = false;
            }
        }
        previous_blank = is_blank(line) && !kind.is_fenced();
        previous = kind;
        kinds.push(kind);
    }
    kinds
}

const CJK_PUNCTUATION: &[(char, char)] = &[
    ('\u{3000}', ' '),
    ('。', '.'),
    ('、', ','),
    ('「', '"'),
    ('」', '"'),
    ('『', '"'),
    ('』', '"'),
    ('【', '['),
    ('】', ']'),
    ('〔', '('),
    ('〕', ')'),
];

/// Full-width ASCII punctuation (U+FF01..U+FF5E) and common CJK marks to ASCII.
fn ascii_punctuation(line: &str) -> String {
    line.chars()
        .map(|c| {
            if ('\u{ff01}'..='\u{ff5e}').contains(&c) {
                let ascii = char::from_u32(c as u32 - 0xfee0).unwrap_or(c);
                if ascii.is_ascii_punctuation() {
                    return ascii;
                }
                return c;
            }
            CJK_PUNCTUATION
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

static RULE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*[-=_*][-=_* \t]*$").unwrap());
static TABLE_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$").unwrap()
});

/// Horizontal rules, setext underlines and table delimiter rows.
fn is_punctuation_exempt(line: &str) -> bool {
    RULE_LINE.is_match(line) || TABLE_DELIMITER.is_match(line)
}

static AUTOLINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^<>\s]*>|<[^<>\s@]+@[^<>\s]+>|https?://[^\s<>]+")
        .unwrap()
});

/// Byte ranges of a line that text passes must not change: inline code
/// spans, link destinations and autolinks.
fn protected_ranges(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' && (i == 0 || bytes[i - 1] != b'\\') {
            let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
            let mut j = i + run;
            let mut closed = None;
            while j < bytes.len() {
                if bytes[j] == b'`' {
                    let close = bytes[j..].iter().take_while(|b| **b == b'`').count();
                    if close == run {
                        closed = Some(j + close);
                        break;
                    }
                    j += close;
                } else {
                    j += 1;
                }
            }
            match closed {
                Some(end) => {
                    ranges.push(i..end);
                    i = end;
                }
                None => i += run,
            }
        } else {
            i += 1;
        }
    }

    let in_code = |pos: usize, ranges: &[Range<usize>]| ranges.iter().any(|r| r.contains(&pos));
    let mut extra = Vec::new();
    for (pos, _) in line.match_indices("](") {
        if in_code(pos, &ranges) {
            continue;
        }
        let start = pos + 2;
        let mut depth = 0usize;
        let mut end = line.len();
        for (offset, c) in line[start..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    end = start + offset;
                    break;
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        extra.push(start..end);
    }
    for found in AUTOLINK.find_iter(line) {
        if !in_code(found.start(), &ranges) {
            extra.push(found.range());
        }
    }
    ranges.extend(extra);
    ranges
}

fn is_protected(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|r| r.contains(&pos))
}

fn opens_quote(previous: Option<char>) -> bool {
    match previous {
        None => true,
        Some(c) => c.is_whitespace() || "([{<\u{2018}\u{201c}\u{2014}\u{2013}-/".contains(c),
    }
}

/// Straight quotes to curly, `--`/`---` to en/em dashes, `...` to an ellipsis.
fn smart_punctuation(line: &str) -> String {
    let ranges = protected_ranges(line);
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut out = String::with_capacity(line.len());
    let mut previous: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let next = |n: usize| chars.get(i + n).map(|(_, c)| *c);
        if is_protected(&ranges, pos) || previous == Some('\\') {
            out.push(c);
            previous = Some(c);
            i += 1;
            continue;
        }
        let (replacement, consumed) = match c {
            '"' if opens_quote(previous) => ('\u{201c}', 1),
            '"' => ('\u{201d}', 1),
            '\'' if previous.is_some_and(char::is_alphanumeric) => ('\u{2019}', 1),
            '\'' if opens_quote(previous) => ('\u{2018}', 1),
            '\'' => ('\u{2019}', 1),
            '-' if next(1) == Some('-') && next(2) == Some('-') => ('\u{2014}', 3),
            '-' if next(1) == Some('-') => ('\u{2013}', 2),
            '.' if next(1) == Some('.') && next(2) == Some('.') => ('\u{2026}', 3),
            other => (other, 1),
        };
        if consumed > 1 && (1..consumed).any(|n| is_protected(&ranges, chars[i + n].0)) {
            out.push(c);
            previous = Some(c);
            i += 1;
            continue;
        }
        out.push(replacement);
        previous = Some(replacement);
        i += consumed;
    }
    out
}

/// Collapse interior runs of two or more spaces/tabs to one space.
///
/// Leading indentation, trailing whitespace (hard breaks) and protected
/// ranges are kept.
fn compact_whitespace(line: &str) -> String {
    let start = line.len() - line.trim_start_matches([' ', '\t']).len();
    let end = line.trim_end_matches([' ', '\t']).len();
    if start >= end {
        return line.to_string();
    }
    let ranges = protected_ranges(line);
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..start]);

    let body: Vec<(usize, char)> = line[start..end]
        .char_indices()
        .map(|(offset, c)| (start + offset, c))
        .collect();
    let mut i = 0;
    while i < body.len() {
        let (pos, c) = body[i];
        if (c == ' ' || c == '\t') && !is_protected(&ranges, pos) {
            let run = body[i..]
                .iter()
                .take_while(|(p, c)| (*c == ' ' || *c == '\t') && !is_protected(&ranges, *p))
                .count();
            if run >= 2 {
                out.push(' ');
            } else {
                out.push(c);
            }
            i += run;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out.push_str(&line[end..]);
    out
}

static ATX_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").unwrap());
static SETEXT_UNDERLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(=+|-+)[ \t]*$").unwrap());
static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+][ \t]|[-*+]$|\d{1,9}[.)]([ \t]|$)|>|#|\||<)").unwrap()
});

/// Text that, on a line of its own, would still be a plain paragraph line.
fn is_paragraph_text(text: &str) -> bool {
    !is_blank(text)
        && indentation(text) < 4
        && !BLOCK_START.is_match(text)
        && !RULE_LINE.is_match(text)
}

fn setext_to_atx(lines: Vec<String>) -> Vec<String> {
    let kinds = classify(&lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous_kind: Option<LineKind> = None;
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        let underline = lines
            .get(i + 1)
            .filter(|_| kinds[i] == LineKind::Text && kinds[i + 1] == LineKind::Text)
            .and_then(|next| SETEXT_UNDERLINE.captures(next))
            .map(|caps| if caps[1].starts_with('=') { 1 } else { 2 });
        // Judged against the output so far, so a converted heading counts.
        let starts_block = match (out.last(), previous_kind) {
            (Some(previous), Some(kind)) => {
                is_blank(previous) || kind == LineKind::Fence || ATX_HEADING.is_match(previous)
            }
            _ => true,
        };
        let text = line.trim();

        match underline {
            Some(level) if starts_block && is_paragraph_text(line) && !text.ends_with('#') => {
                out.push(format!("{} {text}", "#".repeat(level)));
                previous_kind = Some(LineKind::Text);
                i += 2;
            }
            _ => {
                out.push(line.clone());
                previous_kind = Some(kinds[i]);
                i += 1;
            }
        }
    }
    out
}

fn atx_to_setext(lines: Vec<String>) -> Vec<String> {
    let kinds = classify(&lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let heading = (kinds[i] == LineKind::Text)
            .then(|| ATX_HEADING.captures(line))
            .flatten()
            .and_then(|caps| {
                let level = caps[1].len();
                let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                (level <= 2 && is_paragraph_text(text)).then(|| (level, text.to_string()))
            });

        match heading {
            Some((level, text)) => {
                if out.last().is_some_and(|previous| !is_blank(previous)) {
                    out.push(String::new());
                }
                let width = text.chars().count().max(3);
                let underline = if level == 1 { "=" } else { "-" }.repeat(width);
                out.push(text);
                out.push(underline);
            }
            None => out.push(line.clone()),
        }
    }
    out
}

static BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:[ \t]*>[ \t]?)*[ \t]*)([-*+])([ \t]|$)").unwrap());
static ORDERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:[ \t]*>[ \t]?)*[ \t]*)(\d{1,9})([.)])([ \t]|$)").unwrap());

fn list_marker(line: &str, bullet: BulletMarker, ordered: OrderedMarker) -> String {
    if RULE_LINE.is_match(line) {
        return line.to_string();
    }
    if let Some(target) = bullet.as_char() {
        if let Some(caps) = BULLET.captures(line) {
            let marker = caps.get(2).map(|m| m.range());
            if let Some(range) = marker {
                let mut out = line.to_string();
                out.replace_range(range, &target.to_string());
                return out;
            }
        }
    }
    if let Some(target) = ordered.as_char() {
        if let Some(caps) = ORDERED.captures(line) {
            if let Some(range) = caps.get(3).map(|m| m.range()) {
                let mut out = line.to_string();
                out.replace_range(range, &target.to_string());
                return out;
            }
        }
    }
    line.to_string()
}
