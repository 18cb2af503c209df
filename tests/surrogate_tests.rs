use entityfmt::{Dialect, EntityKind, TextEntity};

const DIALECTS: [Dialect; 3] = [Dialect::Markdown, Dialect::Html, Dialect::MarkdownV2];

#[test]
fn test_astral_char_counts_two_units() {
    for (markup, dialect) in [
        ("**😀**", Dialect::Markdown),
        ("<b>😀</b>", Dialect::Html),
        ("**😀**", Dialect::MarkdownV2),
    ] {
        let doc = entityfmt::parse(markup, dialect);
        assert_eq!(doc.text, "😀", "{dialect}");
        assert_eq!(doc.entities, vec![TextEntity::new(0, 2, EntityKind::Bold)], "{dialect}");
    }
}

#[test]
fn test_offsets_after_astral_chars() {
    let doc = entityfmt::parse("😀😀 é **x**", Dialect::Markdown);
    assert_eq!(doc.text, "😀😀 é x");
    assert_eq!(doc.entities, vec![TextEntity::new(7, 1, EntityKind::Bold)]);

    let doc = entityfmt::parse("😀😀 é <i>x</i>", Dialect::Html);
    assert_eq!(doc.entities, vec![TextEntity::new(7, 1, EntityKind::Italic)]);
}

#[test]
fn test_unparse_never_splits_a_pair() {
    // Offset 1 is the middle of the emoji.
    let entities = [TextEntity::new(1, 2, EntityKind::Bold)];
    assert_eq!(
        entityfmt::unparse("😀x", &entities, Dialect::Markdown).unwrap(),
        "😀**x**"
    );
    assert_eq!(
        entityfmt::unparse("😀x", &entities, Dialect::Html).unwrap(),
        "😀<b>x</b>"
    );
    assert_eq!(
        entityfmt::unparse("😀x", &entities, Dialect::MarkdownV2).unwrap(),
        "😀**x**"
    );
}

#[test]
fn test_unparse_output_is_valid_text() {
    let text = "a😀b🎉c";
    for dialect in DIALECTS {
        for offset in 0..text.encode_utf16().count() as u32 {
            let entities = [TextEntity::new(offset, 1, EntityKind::Italic)];
            let out = entityfmt::unparse(text, &entities, dialect).unwrap();
            assert!(!out.contains('\u{FFFD}'), "{dialect} at {offset}: {out}");
            assert_eq!(out.matches('😀').count(), 1, "{dialect} at {offset}: {out}");
            assert_eq!(out.matches('🎉').count(), 1, "{dialect} at {offset}: {out}");
        }
    }
}

#[test]
fn test_entity_spanning_emoji_roundtrips() {
    for dialect in DIALECTS {
        let entities = [TextEntity::new(2, 2, EntityKind::Strike)];
        let out = entityfmt::unparse("a 😀 b", &entities, dialect).unwrap();
        let doc = entityfmt::parse(&out, dialect);
        assert_eq!(doc.text, "a 😀 b", "{dialect}: {out}");
        assert_eq!(doc.entities, entities, "{dialect}: {out}");
    }
}
