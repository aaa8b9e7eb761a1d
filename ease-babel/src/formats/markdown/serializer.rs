//! Markdown serialization (structured document → HTML → Markdown)
//!
//! The document is first written out as HTML, then the DOM is walked and each
//! node turned into Markdown. Before the per-element defaults, an ordered list
//! of [`Rule`]s gets a chance at every element; the first rule whose filter
//! matches produces the replacement. The built-in rules keep fenced code
//! languages and original image sources.
//!
//! Blocks are joined by the number of newlines the two sides ask for, capped
//! at one blank line.

use crate::common::dom;
use crate::common::whitespace::restore_indentation;
use crate::document::{Align, Document};
use crate::formats::html::parser::{cell_align, code_language};
use markup5ever_rcdom::{Handle, NodeData};
use once_cell::sync::Lazy;
use regex::Regex;

/// A serialization override: when `filter` matches an element,
/// `replacement` produces its Markdown instead of the default handler.
pub struct Rule {
    pub name: &'static str,
    pub filter: fn(&Handle) -> bool,
    pub replacement: fn(&Handle) -> String,
}

/// Rules applied before the defaults, in order.
pub const CUSTOM_RULES: &[Rule] = &[
    Rule {
        name: "code_block_with_language",
        filter: is_code_block,
        replacement: fenced_code_block,
    },
    Rule {
        name: "image_with_original",
        filter: is_image,
        replacement: image_with_original,
    },
];

/// Serialize a document to Markdown.
pub fn serialize(doc: &Document) -> String {
    html_to_markdown(&doc.to_html())
}

/// Convert HTML to Markdown using [`CUSTOM_RULES`].
pub fn html_to_markdown(html: &str) -> String {
    html_to_markdown_with_rules(html, CUSTOM_RULES)
}

pub fn html_to_markdown_with_rules(html: &str, rules: &[Rule]) -> String {
    let parsed = dom::parse_html(html);
    let Some(body) = dom::body(&parsed) else {
        return String::new();
    };
    let converter = Converter { rules };
    let output = converter.process(&body, false);
    let trimmed = output
        .trim_start_matches(['\n', '\r', '\t'])
        .trim_end_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

fn is_code_block(node: &Handle) -> bool {
    dom::is_element(node, "pre")
        && dom::element_children(node)
            .first()
            .is_some_and(|first| dom::is_element(first, "code"))
}

fn fenced_code_block(node: &Handle) -> String {
    let code = dom::element_children(node).into_iter().next();
    let language = code_language(node, code.as_ref()).unwrap_or_default();
    let text = dom::text_content(code.as_ref().unwrap_or(node));
    fence(&text, &language)
}

/// Fenced block whose backtick fence is longer than any run inside the code.
fn fence(code: &str, language: &str) -> String {
    let code = code.strip_suffix('\n').unwrap_or(code);
    let longest = longest_run(code, '`');
    let fence = "`".repeat(longest.max(2) + 1);
    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

fn longest_run(text: &str, target: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == target {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn is_image(node: &Handle) -> bool {
    dom::is_element(node, "img")
}

fn image_with_original(node: &Handle) -> String {
    let alt = dom::attr(node, "alt").unwrap_or_default();
    let src = dom::attr(node, "data-original")
        .filter(|o| !o.is_empty())
        .or_else(|| dom::attr(node, "src"))
        .unwrap_or_default();
    let title = dom::attr(node, "title")
        .filter(|t| !t.is_empty())
        .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
        .unwrap_or_default();
    format!("![{}]({}{title})", escape_brackets(&alt), destination(&src))
}

fn escape_brackets(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

/// Link destination, wrapped in `<>` when it would not parse bare.
fn destination(url: &str) -> String {
    let balanced = url.matches('(').count() == url.matches(')').count();
    if url.contains(char::is_whitespace) || !balanced {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

/// Join two chunks of output, keeping the larger of the newline runs on
/// either side of the seam (at most one blank line).
fn join(output: &str, addition: &str) -> String {
    let trimmed_output = output.trim_end_matches('\n');
    let trailing = output.len() - trimmed_output.len();
    let trimmed_addition = addition.trim_start_matches('\n');
    let leading = addition.len() - trimmed_addition.len();
    let separator = "\n".repeat(trailing.max(leading).min(2));
    format!("{trimmed_output}{separator}{trimmed_addition}")
}

fn block(content: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{content}\n\n")
    }
}

fn trim_ascii(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii_whitespace())
}

static LINE_START_ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^-").unwrap(), r"\-"),
        (Regex::new(r"^\+ ").unwrap(), r"\+ "),
        (Regex::new(r"^(=+)").unwrap(), r"\$1"),
        (Regex::new(r"^(#{1,6}) ").unwrap(), r"\$1 "),
        (Regex::new(r"^>").unwrap(), r"\>"),
        (Regex::new(r"^(\d+)\. ").unwrap(), r"$1\. "),
        (Regex::new(r"^(\d+)\) ").unwrap(), r"$1\) "),
    ]
});

/// `&` followed by something the parser would decode as a character reference.
static ENTITY_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7};|#[xX][0-9a-fA-F]{1,6};|[A-Za-z][A-Za-z0-9]{1,31};)").unwrap()
});

/// A closing `#` run would be stripped from an ATX heading.
static CLOSING_HASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|[ \t])(#+)$").unwrap());

/// Backslash-escape Markdown syntax in plain text.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '~') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    for (pattern, replacement) in LINE_START_ESCAPES.iter() {
        escaped = pattern.replace(&escaped, *replacement).into_owned();
    }
    ENTITY_LIKE.replace_all(&escaped, r"\&$1").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Restore indentation on every line after the first.
///
/// Leading spaces on a block's first line would change the block type
/// (four of them start an indented code block), so that line keeps its
/// no-break spaces.
fn restore_continuation_lines(content: &str) -> String {
    match content.split_once('\n') {
        Some((first, rest)) => format!("{first}\n{}", restore_indentation(rest)),
        None => content.to_string(),
    }
}

fn is_list(node: &Handle) -> bool {
    dom::is_element(node, "ul") || dom::is_element(node, "ol")
}

struct Converter<'r> {
    rules: &'r [Rule],
}

impl Converter<'_> {
    /// Convert the children of `parent`. Inside list items, a nested list
    /// follows the preceding line directly instead of after a blank line.
    fn process(&self, parent: &Handle, in_list_item: bool) -> String {
        let children: Vec<Handle> = parent.children.borrow().iter().cloned().collect();
        let mut output = String::new();

        for (index, child) in children.iter().enumerate() {
            let replacement = match &child.data {
                NodeData::Text { contents } => self.text(&contents.borrow(), &output),
                NodeData::Element { .. } => self.element(child, &children[index + 1..], &output),
                _ => continue,
            };
            if in_list_item && is_list(child) && !output.is_empty() {
                let trimmed = output.trim_end_matches('\n');
                output = format!("{trimmed}\n{}", replacement.trim_start_matches('\n'));
            } else {
                output = join(&output, &replacement);
            }
        }
        output
    }

    fn text(&self, raw: &str, output: &str) -> String {
        let mut text = collapse_whitespace(raw);
        let at_gap = output.is_empty() || output.ends_with(' ') || output.ends_with('\n');
        if at_gap && text.starts_with(' ') {
            text.remove(0);
        }
        escape_markdown(&text)
    }

    fn element(&self, node: &Handle, following: &[Handle], output: &str) -> String {
        if let Some(rule) = self.rules.iter().find(|rule| (rule.filter)(node)) {
            tracing::trace!(rule = rule.name, "serialization rule applied");
            return (rule.replacement)(node);
        }

        let tag = dom::tag_name(node).unwrap_or_default();
        match tag.as_str() {
            "p" => {
                let content = self.process(node, false);
                block(&restore_continuation_lines(trim_ascii(&content)))
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let content = self.process(node, false).replace("  \n", " ");
                let content = CLOSING_HASHES.replace(trim_ascii(&content), r"$1\$2");
                block(&format!("{} {content}", "#".repeat(level)))
            }
            "br" => "  \n".to_string(),
            "hr" => block("---"),
            "blockquote" => {
                let content = self.process(node, false);
                let quoted = content
                    .trim_matches('\n')
                    .lines()
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                block(&quoted)
            }
            "ul" | "ol" => block(&self.list(node, tag == "ol")),
            "pre" => fence(&dom::text_content(node), ""),
            "code" => code_span(&dom::text_content(node)),
            "strong" | "b" => wrap(&self.process(node, false), "**"),
            "em" | "i" => {
                let delimiter = emphasis_delimiter(output, following);
                wrap(&self.process(node, false), delimiter)
            }
            "s" | "del" | "strike" => wrap(&self.process(node, false), "~~"),
            "a" => self.link(node),
            "table" => block(&self.table(node)),
            "div" | "section" | "article" | "main" | "header" | "footer" | "aside" | "nav"
            | "figure" => block(trim_ascii(&self.process(node, false))),
            _ => self.process(node, false),
        }
    }

    fn list(&self, node: &Handle, ordered: bool) -> String {
        let start = dom::attr(node, "start")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);
        let items: Vec<Handle> = dom::element_children(node);
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let prefix = if ordered {
                    format!("{}. ", start + index as u64)
                } else {
                    "- ".to_string()
                };
                let content = self.process(item, true);
                let content = content.trim_matches('\n');
                if content.trim().is_empty() {
                    return prefix.trim_end().to_string();
                }
                let indent = " ".repeat(prefix.len());
                let mut lines = content.lines();
                let mut rendered = format!("{prefix}{}", lines.next().unwrap_or_default());
                for line in lines {
                    rendered.push('\n');
                    if !line.is_empty() {
                        rendered.push_str(&indent);
                        rendered.push_str(line);
                    }
                }
                rendered
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn link(&self, node: &Handle) -> String {
        let href = dom::attr(node, "href").unwrap_or_default();
        let content = self.process(node, false);
        let has_scheme = href.contains("://") || href.starts_with("mailto:");
        if has_scheme && dom::text_content(node) == href && !href.contains(char::is_whitespace) {
            return format!("<{href}>");
        }
        let title = dom::attr(node, "title")
            .filter(|t| !t.is_empty())
            .map(|t| format!(" \"{}\"", t.replace('"', "\\\"")))
            .unwrap_or_default();
        format!("[{}]({}{title})", trim_ascii(&content), destination(&href))
    }

    fn table(&self, node: &Handle) -> String {
        let mut rows = Vec::new();
        collect_rows(node, &mut rows);
        if rows.is_empty() {
            return String::new();
        }

        let cells: Vec<Vec<(String, Align)>> = rows
            .iter()
            .map(|row| {
                dom::element_children(row)
                    .iter()
                    .filter(|c| dom::is_element(c, "th") || dom::is_element(c, "td"))
                    .map(|cell| {
                        let content = self.process(cell, false);
                        let content = trim_ascii(&content).replace("  \n", " ").replace('\n', " ");
                        (content.replace('|', "\\|"), cell_align(cell))
                    })
                    .collect()
            })
            .collect();
        let width = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let format_row = |row: &[(String, Align)]| {
            let values: Vec<&str> = (0..width)
                .map(|i| row.get(i).map(|(c, _)| c.as_str()).unwrap_or(""))
                .collect();
            format!("| {} |", values.join(" | "))
        };

        let header = &cells[0];
        let delimiter = (0..width)
            .map(|i| match header.get(i).map(|(_, a)| *a).unwrap_or_default() {
                Align::None => "---",
                Align::Left => ":---",
                Align::Center => ":---:",
                Align::Right => "---:",
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let mut lines = vec![format_row(header), format!("| {delimiter} |")];
        lines.extend(cells[1..].iter().map(|row| format_row(row)));
        lines.join("\n")
    }
}

fn collect_rows(node: &Handle, rows: &mut Vec<Handle>) {
    for child in dom::element_children(node) {
        match dom::tag_name(&child).as_deref() {
            Some("thead" | "tbody" | "tfoot") => collect_rows(&child, rows),
            Some("tr") => rows.push(child),
            _ => {}
        }
    }
}

/// Backtick span long enough to hold any backtick run in `code`.
fn code_span(code: &str) -> String {
    let code = code.replace('\n', " ");
    if code.is_empty() {
        return String::new();
    }
    let fence = "`".repeat(longest_run(&code, '`') + 1);
    let needs_padding = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    if needs_padding {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

/// Wrap inline content in a delimiter, moving edge whitespace outside.
fn wrap(content: &str, delimiter: &str) -> String {
    let inner = trim_ascii(content);
    if inner.is_empty() {
        return content.to_string();
    }
    let start = content.len() - content.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    let end = content.trim_end_matches(|c: char| c.is_ascii_whitespace()).len();
    format!(
        "{}{delimiter}{inner}{delimiter}{}",
        &content[..start],
        &content[end..]
    )
}

/// `_` unless the emphasis touches a word character, where only `*` works.
fn emphasis_delimiter(output: &str, following: &[Handle]) -> &'static str {
    let before = output.chars().last().is_some_and(char::is_alphanumeric);
    let after = following
        .first()
        .map(dom::text_content)
        .and_then(|text| text.chars().next())
        .is_some_and(char::is_alphanumeric);
    if before || after {
        "*"
    } else {
        "_"
    }
}
