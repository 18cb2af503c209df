use entityfmt::{Dialect, EntityKind, FormattedText, MarkdownV2Dialect, Options, TextEntity, Warning};

fn v2(markup: &str) -> FormattedText {
    entityfmt::parse(markup, Dialect::MarkdownV2)
}

fn v2_out(text: &str, entities: &[TextEntity]) -> String {
    entityfmt::unparse(text, entities, Dialect::MarkdownV2).unwrap()
}

#[test]
fn test_quote_lines_collapse_into_one_entity() {
    let doc = v2(">> a\n>> b");
    assert_eq!(doc.text, "a\nb");
    assert_eq!(
        doc.entities,
        vec![TextEntity::new(0, 3, EntityKind::Blockquote { collapsed: false })]
    );
}

#[test]
fn test_quote_prefix_without_space() {
    let doc = v2(">>a\n>>b\nc");
    assert_eq!(doc.text, "a\nb\nc");
    assert_eq!(
        doc.entities,
        vec![TextEntity::new(0, 3, EntityKind::Blockquote { collapsed: false })]
    );
}

#[test]
fn test_separate_quote_runs() {
    let doc = v2(">> a\nx\n>> b");
    assert_eq!(doc.text, "a\nx\nb");
    assert_eq!(
        doc.entities,
        vec![
            TextEntity::new(0, 1, EntityKind::Blockquote { collapsed: false }),
            TextEntity::new(4, 1, EntityKind::Blockquote { collapsed: false }),
        ]
    );
}

#[test]
fn test_expandable_quote_block() {
    let doc = v2("^^ a\nb\n>> c!^^\nd");
    assert_eq!(doc.text, "a\nb\nc\nd");
    assert_eq!(
        doc.entities,
        vec![TextEntity::new(0, 5, EntityKind::Blockquote { collapsed: true })]
    );
}

#[test]
fn test_unterminated_expandable_quote_warns() {
    let (doc, warnings) =
        entityfmt::parse_with_warnings("x\n^^ a\nb", Dialect::MarkdownV2, entityfmt::default_options());
    assert_eq!(doc, FormattedText::plain("x\n^^ a\nb"));
    assert_eq!(warnings, vec![Warning::UnterminatedQuote { line: 2 }]);
}

#[test]
fn test_toggles() {
    let doc = v2("**b** __i__ --u-- ~~s~~ ||x|| `c`");
    assert_eq!(doc.text, "b i u s x c");
    assert_eq!(
        doc.entities,
        vec![
            TextEntity::new(0, 1, EntityKind::Bold),
            TextEntity::new(2, 1, EntityKind::Italic),
            TextEntity::new(4, 1, EntityKind::Underline),
            TextEntity::new(6, 1, EntityKind::Strike),
            TextEntity::new(8, 1, EntityKind::Spoiler),
            TextEntity::new(10, 1, EntityKind::Code),
        ]
    );
}

#[test]
fn test_fixed_width_suppresses_toggles() {
    let doc = v2("`a **b**` **c**");
    assert_eq!(doc.text, "a **b** c");
    assert_eq!(
        doc.entities,
        vec![
            TextEntity::new(0, 7, EntityKind::Code),
            TextEntity::new(8, 1, EntityKind::Bold),
        ]
    );
}

#[test]
fn test_pre_language() {
    let doc = v2("```rust\nfn x\n```");
    assert_eq!(doc.text, "fn x");
    assert_eq!(doc.entities, vec![TextEntity::new(0, 4, EntityKind::pre("rust"))]);
}

#[test]
fn test_links_mentions_and_emoji() {
    let doc = v2("[a](http://e.com) [b](tg://user?id=8) ![c](tg://emoji?id=9)");
    assert_eq!(doc.text, "a b c");
    assert_eq!(
        doc.entities,
        vec![
            TextEntity::new(0, 1, EntityKind::text_url("http://e.com")),
            TextEntity::new(2, 1, EntityKind::MentionName { user_id: 8 }),
            TextEntity::new(4, 1, EntityKind::CustomEmoji { document_id: 9 }),
        ]
    );
}

#[test]
fn test_unparse_quote_and_toggles() {
    let entities = [
        TextEntity::new(0, 3, EntityKind::Blockquote { collapsed: false }),
        TextEntity::new(2, 1, EntityKind::Underline),
    ];
    assert_eq!(v2_out("a\nb", &entities), ">> a\n>> --b--");
}

#[test]
fn test_unparse_then_parse_restores_document() {
    let original = v2(">> **quoted** line\n>> second\nplain [link](http://e.com) & ||hidden||");
    let markup = v2_out(&original.text, &original.entities);
    assert_eq!(v2(&markup), original);
}

#[test]
fn test_strict_mode_keeps_markup_literal() {
    let options = Options {
        markdown_v2: MarkdownV2Dialect::default().strict(true),
        ..Options::default()
    };
    let doc = entityfmt::parse_with_options("<b>x</b> & **y**", Dialect::MarkdownV2, &options);
    assert_eq!(doc.text, "<b>x</b> & y");
    assert_eq!(doc.entities, vec![TextEntity::new(11, 1, EntityKind::Bold)]);
}
