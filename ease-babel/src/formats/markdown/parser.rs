//! Markdown rendering (Markdown → HTML → structured document)
//!
//! Pipeline: Markdown string → Comrak AST → neutralized AST → HTML string →
//! image decoration → indentation preservation → Document.
//!
//! Raw HTML in the source never becomes markup: HTML blocks are turned into
//! paragraphs of literal text and inline HTML into text before rendering. Only
//! the code blocks we highlight ourselves are emitted as raw HTML.

use crate::common::images::decorate_images;
use crate::common::languages::{highlight, info_string_language, PLAINTEXT};
use crate::common::whitespace::{expand_tabs, preserve_indentation};
use crate::document::Document;
use comrak::nodes::{Ast, AstNode, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, ComrakOptions};
use std::cell::RefCell;
use std::path::PathBuf;

/// Render-time options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Curly quotes, en/em dashes and ellipses.
    pub typographer: bool,
    /// Render single newlines inside paragraphs as `<br>`.
    pub soft_breaks_as_line_breaks: bool,
    /// Turn bare URLs into links.
    pub linkify: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            typographer: true,
            soft_breaks_as_line_breaks: true,
            linkify: true,
        }
    }
}

/// Everything needed to load Markdown into the rich view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    /// Path of the document being loaded, used to resolve relative images.
    pub document_path: Option<PathBuf>,
    /// Spaces per tab, both in the source and in preserved indentation.
    pub tab_width: usize,
    pub render: RenderOptions,
}

impl Default for LoadContext {
    fn default() -> Self {
        Self {
            document_path: None,
            tab_width: 2,
            render: RenderOptions::default(),
        }
    }
}

impl LoadContext {
    pub fn for_path(document_path: Option<PathBuf>) -> Self {
        Self {
            document_path,
            ..Self::default()
        }
    }
}

fn comrak_options(options: &RenderOptions) -> ComrakOptions<'static> {
    let mut comrak = ComrakOptions::default();
    comrak.extension.table = true;
    comrak.extension.strikethrough = true;
    comrak.extension.autolink = options.linkify;
    comrak.parse.smart = options.typographer;
    comrak.render.hardbreaks = options.soft_breaks_as_line_breaks;
    // Safe: all author HTML is rewritten to text before rendering.
    comrak.render.unsafe_ = true;
    comrak
}

/// Render Markdown to HTML. Total and deterministic.
pub fn render(markdown: &str, options: &RenderOptions) -> String {
    let arena = Arena::new();
    let comrak = comrak_options(options);
    let root = parse_document(&arena, markdown, &comrak);

    neutralize(&arena, root);

    let mut output = Vec::new();
    if let Err(e) = format_html(root, &comrak, &mut output) {
        tracing::debug!("markdown rendering failed: {e}");
    }
    String::from_utf8_lossy(&output).into_owned()
}

/// Rewrite author HTML to text, blank unsafe URLs and highlight code blocks.
fn neutralize<'a>(arena: &'a Arena<AstNode<'a>>, root: &'a AstNode<'a>) {
    let nodes: Vec<&'a AstNode<'a>> = root.descendants().collect();
    for node in nodes {
        let mut block_lines = None;
        {
            let mut ast = node.data.borrow_mut();
            match &mut ast.value {
                NodeValue::HtmlInline(literal) => {
                    let text = std::mem::take(literal);
                    ast.value = NodeValue::Text(text);
                }
                NodeValue::HtmlBlock(block) => {
                    block_lines = Some(std::mem::take(&mut block.literal));
                    ast.value = NodeValue::Paragraph;
                }
                NodeValue::Link(link) => {
                    if is_unsafe_url(&link.url, false) {
                        link.url.clear();
                    }
                }
                NodeValue::Image(link) => {
                    if is_unsafe_url(&link.url, true) {
                        link.url.clear();
                    }
                }
                NodeValue::CodeBlock(block) => {
                    let html = code_block_html(&block.info, &block.literal);
                    ast.value = NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 0,
                        literal: html,
                    });
                }
                _ => {}
            }
        }

        if let Some(literal) = block_lines {
            for (index, line) in literal.trim_end_matches('\n').split('\n').enumerate() {
                if index > 0 {
                    node.append(new_node(arena, NodeValue::SoftBreak));
                }
                node.append(new_node(arena, NodeValue::Text(line.to_string())));
            }
        }
    }
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
}

fn is_unsafe_url(url: &str, image: bool) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") {
        return true;
    }
    !image && (lower.starts_with("file:") || lower.starts_with("data:"))
}

/// HTML for a fenced or indented code block.
///
/// Recognized languages are highlighted; anything else is classified as
/// `plaintext` while the declared tag survives in `data-language`.
pub fn code_block_html(info: &str, code: &str) -> String {
    let language = info_string_language(info);
    let highlighted = language
        .as_deref()
        .and_then(|lang| highlight(lang, code).map(|html| (lang, html)));

    match highlighted {
        Some((lang, html)) => {
            let lang = html_escape(lang);
            format!(
                "<pre class=\"hljs\" data-language=\"{lang}\"><code class=\"language-{lang}\">{html}</code></pre>\n"
            )
        }
        None => {
            let data_language = language
                .map(|lang| format!(" data-language=\"{}\"", html_escape(&lang)))
                .unwrap_or_default();
            format!(
                "<pre class=\"hljs\"{data_language}><code class=\"language-{PLAINTEXT}\">{}</code></pre>\n",
                html_escape(code)
            )
        }
    }
}

/// Escape HTML special characters in text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render Markdown into the HTML the rich view loads: tabs expanded, images
/// resolved for display, leading indentation preserved.
pub fn markdown_to_html(markdown: &str, context: &LoadContext) -> String {
    let source = expand_tabs(markdown, context.tab_width);
    let html = render(&source, &context.render);
    let html = decorate_images(&html, context.document_path.as_deref());
    preserve_indentation(&html, context.tab_width)
}

/// Load Markdown into a structured document.
pub fn load_document(markdown: &str, context: &LoadContext) -> Document {
    Document::from_html(&markdown_to_html(markdown, context))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_default(markdown: &str) -> String {
        render(markdown, &RenderOptions::default())
    }

    #[test]
    fn raw_html_is_literal_text() {
        let html = render_default("<div onclick=\"x()\">hi</div>\n\nsome <b>inline</b>\n");
        assert!(!html.contains("<div"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;div onclick=&quot;x()&quot;&gt;hi&lt;/div&gt;"));
        assert!(html.contains("some &lt;b&gt;inline&lt;/b&gt;"));
    }

    #[test]
    fn unsafe_links_are_blanked() {
        let html = render_default("[x](javascript:alert(1))\n");
        assert!(!html.contains("javascript"));
    }

    #[test]
    fn known_language_is_highlighted() {
        let html = render_default("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre class=\"hljs\" data-language=\"rust\"><code class=\"language-rust\">"));
        assert!(html.contains("hljs-"));
    }

    #[test]
    fn unknown_language_is_plaintext() {
        let html = render_default("```klingon\nqapla'\n```\n");
        assert!(html.contains("data-language=\"klingon\""));
        assert!(html.contains("<code class=\"language-plaintext\">qapla'\n</code>"));
    }

    #[test]
    fn untagged_block_has_no_data_language() {
        let html = render_default("```\nplain\n```\n");
        assert_eq!(
            html,
            "<pre class=\"hljs\"><code class=\"language-plaintext\">plain\n</code></pre>\n"
        );
    }

    #[test]
    fn options_toggle_typography() {
        let plain = RenderOptions {
            typographer: false,
            soft_breaks_as_line_breaks: false,
            linkify: false,
        };
        assert_eq!(render("a -- b\nc", &plain), "<p>a -- b\nc</p>\n");
        assert_eq!(
            render_default("a -- b\nc"),
            "<p>a \u{2013} b<br />\nc</p>\n"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let source = "# T\n\n- a\n- b\n\n```py\nx = 1\n```\n";
        assert_eq!(render_default(source), render_default(source));
    }

    #[test]
    fn tabs_are_expanded_before_rendering() {
        let context = LoadContext::default();
        let html = markdown_to_html("```\n\tx\n```\n", &context);
        assert!(html.contains("  x"));
    }
}
