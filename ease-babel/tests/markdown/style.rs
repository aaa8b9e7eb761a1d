//! Style normalization over whole documents.

use crate::common::fixture;
use ease_babel::formats::markdown::style::{
    apply_newline_style, normalize, BulletMarker, HeadingStyle, NewlineStyle, OrderedMarker,
    StyleRules,
};
use proptest::prelude::*;

fn every_rule(heading_style: HeadingStyle) -> StyleRules {
    StyleRules {
        heading_style,
        bullet_marker: BulletMarker::Plus,
        ordered_marker: OrderedMarker::Paren,
        compact_whitespace: true,
        smart_punctuation: true,
        ascii_punctuation: true,
    }
}

#[test]
fn fenced_content_is_untouched_by_every_rule() {
    let fenced = "```md\n**not bold**  --  \"x\"...\n* item\n1. one\nTitle\n===\n# H\n```";
    let source = format!("# Doc\n\n{fenced}\n\nAfter -- \"this\".\n");
    for style in [HeadingStyle::Atx, HeadingStyle::Setext] {
        let out = normalize(&source, &every_rule(style));
        assert!(out.contains(fenced), "fence changed under {style:?}:\n{out}");
    }
}

#[test]
fn kitchensink_normalizes_idempotently() {
    let source = fixture("kitchensink.md");
    for style in [HeadingStyle::Keep, HeadingStyle::Atx, HeadingStyle::Setext] {
        let once = normalize(&source, &every_rule(style));
        assert_eq!(normalize(&once, &every_rule(style)), once);
    }
}

#[test]
fn code_in_kitchensink_survives() {
    let out = normalize(&fixture("kitchensink.md"), &every_rule(HeadingStyle::Setext));
    assert!(out.contains("```rust\nfn main() {\n    println!(\"hello\");\n}\n```"));
    assert!(out.contains("Kitchen Sink\n============"));
    assert!(out.contains("+ First item"));
    assert!(out.contains("3) Third"));
}

#[test]
fn crlf_is_applied_after_normalizing() {
    let out = normalize("a\r\nb\r\n", &StyleRules::default());
    assert_eq!(out, "a\nb\n");
    assert_eq!(apply_newline_style(&out, NewlineStyle::Crlf), "a\r\nb\r\n");
}

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,12}",
        "#{1,3} [a-z]{1,6}",
        "[-*+] [a-z\"' .]{1,10}",
        "[0-9]{1,2}[.)] [a-z]{1,6}",
        "[a-z]{1,4}  +[a-z]{1,4}",
        Just("---".to_string()),
        Just("===".to_string()),
        Just("```".to_string()),
        Just("> quoted -- text...".to_string()),
        Just("`a  --  b` and \"c\"".to_string()),
        Just("，。「」".to_string()),
    ]
}

proptest! {
    #[test]
    fn normalize_is_idempotent(lines in prop::collection::vec(line(), 0..16), setext in any::<bool>()) {
        let source = lines.join("\n");
        let rules = every_rule(if setext { HeadingStyle::Setext } else { HeadingStyle::Atx });
        let once = normalize(&source, &rules);
        prop_assert_eq!(normalize(&once, &rules), once);
    }
}
