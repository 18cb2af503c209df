//! Property: re-rendering a parsed document and parsing it again yields the
//! same text and the same set of entities.

use std::cmp::Reverse;

use entityfmt::{Dialect, FormattedText, TextEntity};
use proptest::prelude::*;

/// Words free of markup characters, with some non-ASCII content.
fn word() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("a"),
            Just("Z"),
            Just("7"),
            Just("é"),
            Just("😀"),
            Just("ü"),
            Just("q"),
        ],
        1..6,
    )
    .prop_map(|parts| parts.concat())
}

/// One word with an optional innermost leaf span (by index into a
/// dialect's leaf table, 0 for none), up to two wrappers around it, and
/// whether it is glued to the previous segment without a space.
#[derive(Debug, Clone)]
struct Segment {
    word: String,
    leaf: usize,
    wrappers: Vec<usize>,
    glued: bool,
}

fn segments() -> impl Strategy<Value = Vec<Segment>> {
    prop::collection::vec(
        (word(), 0usize..7, prop::collection::vec(0usize..5, 0..3), any::<bool>()).prop_map(
            |(word, leaf, wrappers, glued)| Segment {
                word,
                leaf,
                wrappers,
                glued,
            },
        ),
        1..8,
    )
}

/// Markup for each dialect: leaf spans (code, pre, links) and symmetric
/// wrappers.
trait Syntax {
    fn leaf(word: &str, leaf: usize) -> String;
    fn wrap(inner: &str, wrapper: usize) -> String;
}

fn build<S: Syntax>(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 && !segment.glued {
            out.push(' ');
        }
        let mut seen = Vec::new();
        let mut markup = S::leaf(&segment.word, segment.leaf);
        for &w in &segment.wrappers {
            if !seen.contains(&w) {
                seen.push(w);
                markup = S::wrap(&markup, w);
            }
        }
        out.push_str(&markup);
    }
    out
}

struct Markdown;

impl Syntax for Markdown {
    fn leaf(word: &str, leaf: usize) -> String {
        match leaf {
            1 => format!("`{word}`"),
            2 => format!("```\n{word}\n```"),
            3 => format!("```py\n{word}\n```"),
            4 => format!("[{word}](http://e.com/{})", word.len()),
            5 => format!("[{word}](emoji/{})", word.len()),
            _ => word.to_owned(),
        }
    }

    fn wrap(inner: &str, wrapper: usize) -> String {
        let token = ["**", "__", "~~", "||", "^^"][wrapper];
        format!("{token}{inner}{token}")
    }
}

struct Html;

impl Syntax for Html {
    fn leaf(word: &str, leaf: usize) -> String {
        match leaf {
            1 => format!("<code>{word}</code>"),
            2 => format!("<pre>{word}</pre>"),
            3 => format!("<pre language=\"py\">{word}</pre>"),
            4 => format!("<a href=\"http://e.com/{}\">{word}</a>", word.len()),
            5 => format!("<emoji document_id=\"{}\">{word}</emoji>", word.len()),
            6 => format!("<a href=\"tg://user?id={}\">{word}</a>", word.len()),
            _ => word.to_owned(),
        }
    }

    fn wrap(inner: &str, wrapper: usize) -> String {
        let tag = ["b", "i", "u", "s", "spoiler"][wrapper];
        format!("<{tag}>{inner}</{tag}>")
    }
}

struct MarkdownV2;

impl Syntax for MarkdownV2 {
    fn leaf(word: &str, leaf: usize) -> String {
        match leaf {
            1 => format!("`{word}`"),
            2 => format!("```\n{word}\n```"),
            3 => format!("```py\n{word}\n```"),
            4 => format!("[{word}](http://e.com/{})", word.len()),
            5 => format!("![{word}](tg://emoji?id={})", word.len()),
            6 => format!("[{word}](tg://user?id={})", word.len()),
            _ => word.to_owned(),
        }
    }

    fn wrap(inner: &str, wrapper: usize) -> String {
        let token = ["**", "__", "--", "~~", "||"][wrapper];
        format!("{token}{inner}{token}")
    }
}

/// Entities in a canonical order, so reordering of identical spans does not
/// count as a difference.
fn normalized(doc: FormattedText) -> (String, Vec<TextEntity>) {
    let mut entities = doc.entities;
    entities.sort_by_key(|e| (e.offset, Reverse(e.length), format!("{:?}", e.kind)));
    (doc.text, entities)
}

fn assert_roundtrip(markup: &str, dialect: Dialect) -> Result<(), TestCaseError> {
    let first = entityfmt::parse(markup, dialect);
    let rendered = entityfmt::unparse(&first.text, &first.entities, dialect)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let second = entityfmt::parse(&rendered, dialect);
    prop_assert_eq!(
        normalized(second),
        normalized(first),
        "markup: {:?}, rendered: {:?}",
        markup,
        rendered
    );
    Ok(())
}

proptest! {
    #[test]
    fn prop_markdown_roundtrip(segments in segments()) {
        assert_roundtrip(&build::<Markdown>(&segments), Dialect::Markdown)?;
    }

    #[test]
    fn prop_html_roundtrip(segments in segments()) {
        assert_roundtrip(&build::<Html>(&segments), Dialect::Html)?;
    }

    #[test]
    fn prop_markdown_v2_roundtrip(segments in segments()) {
        assert_roundtrip(&build::<MarkdownV2>(&segments), Dialect::MarkdownV2)?;
    }

    #[test]
    fn prop_parse_never_panics(markup in "[a-z*_~|`\\[\\]()<>/!^&\n 😀-]{0,40}") {
        for dialect in [Dialect::Markdown, Dialect::Html, Dialect::MarkdownV2] {
            let doc = entityfmt::parse(&markup, dialect);
            let len = doc.text.encode_utf16().count() as u32;
            prop_assert!(doc.entities.iter().all(|e| e.offset + e.length <= len));
        }
    }
}

#[test]
fn test_fixed_examples_roundtrip() {
    for (markup, dialect) in [
        ("**a __b__ c** [d](http://e.com)", Dialect::Markdown),
        ("```py\nprint(1)\n```", Dialect::Markdown),
        ("<b>a<i>b</i></b>c", Dialect::Html),
        ("<blockquote>q <code>c</code></blockquote> t", Dialect::Html),
        (">> a\n>> **b**\nc", Dialect::MarkdownV2),
        ("^^ x\ny!^^\nz", Dialect::MarkdownV2),
        ("`a`**b**", Dialect::Markdown),
        ("**a**`b`", Dialect::Markdown),
        ("```py\na\n```**b**", Dialect::Markdown),
        ("`a`**b**", Dialect::MarkdownV2),
        ("```py\na\n```**b**", Dialect::MarkdownV2),
        ("<code>a</code><b>b</b>", Dialect::Html),
    ] {
        assert_roundtrip(markup, dialect).unwrap();
    }
}
