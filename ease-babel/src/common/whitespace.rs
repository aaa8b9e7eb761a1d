//! Leading-whitespace preservation
//!
//! The rich view collapses ordinary whitespace, so indentation at the start of
//! a line outside code is carried as U+00A0 (no-break space) instead. The
//! serializer maps it back with [`restore_indentation`].

use super::dom;
use markup5ever_rcdom::NodeData;

pub const NBSP: char = '\u{a0}';

/// Replace each line's leading ASCII spaces with no-break spaces in every
/// text node of `html` that is not inside `<pre>` or `<code>`. A text node's
/// first line only counts when the node begins a line; text following an
/// inline element keeps its spaces.
///
/// Tabs are first expanded to `tab_width` spaces. Running this twice gives the
/// same result as running it once: after the first pass no line starts with an
/// ASCII space.
pub fn preserve_indentation(html: &str, tab_width: usize) -> String {
    dom::rewrite_body(html, |body| {
        dom::walk(body, &mut |node, ancestors| {
            if ancestors.iter().any(|tag| tag == "pre" || tag == "code") {
                return;
            }
            if let NodeData::Text { contents } = &node.data {
                let current = contents.borrow().to_string();
                let preserved = preserve_lines(&current, tab_width, dom::starts_line(node));
                if preserved != current {
                    *contents.borrow_mut() = preserved.into();
                }
            }
        });
    })
}

/// Text-level half of [`preserve_indentation`], for text that starts a line.
pub fn preserve_text(text: &str, tab_width: usize) -> String {
    preserve_lines(text, tab_width, true)
}

fn preserve_lines(text: &str, tab_width: usize, first_line_starts: bool) -> String {
    let expanded = expand_tabs(text, tab_width);
    expanded
        .split('\n')
        .enumerate()
        .map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if index == 0 && !first_line_starts {
                return line.to_string();
            }
            let content = line.trim_start_matches(' ');
            let indent = line.len() - content.len();
            let mut out = String::with_capacity(line.len() + indent);
            out.extend(std::iter::repeat(NBSP).take(indent));
            out.push_str(content);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn expand_tabs(text: &str, tab_width: usize) -> String {
    if text.contains('\t') {
        text.replace('\t', &" ".repeat(tab_width))
    } else {
        text.to_string()
    }
}

/// Turn each line's leading no-break spaces back into ASCII spaces.
pub fn restore_indentation(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let content = line.trim_start_matches(NBSP);
            let indent = line[..line.len() - content.len()].chars().count();
            format!("{}{content}", " ".repeat(indent))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
