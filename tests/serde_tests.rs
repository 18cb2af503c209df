#![cfg(feature = "serde")]

use entityfmt::{EntityKind, FormattedText, TextEntity};
use serde_json::json;

#[test]
fn test_entity_json_shape() {
    let doc = FormattedText::new(
        "a b",
        vec![
            TextEntity::new(0, 1, EntityKind::pre("rust")),
            TextEntity::new(2, 1, EntityKind::MentionName { user_id: 42 }),
        ],
    );
    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        json!({
            "text": "a b",
            "entities": [
                {"offset": 0, "length": 1, "type": "pre", "language": "rust"},
                {"offset": 2, "length": 1, "type": "mention_name", "user_id": 42},
            ]
        })
    );
}

#[test]
fn test_defaults_when_fields_missing() {
    let doc: FormattedText = serde_json::from_value(json!({
        "text": "x",
        "entities": [
            {"offset": 0, "length": 1, "type": "blockquote"},
            {"offset": 0, "length": 1, "type": "pre"},
        ]
    }))
    .unwrap();
    assert_eq!(doc.entities[0].kind, EntityKind::Blockquote { collapsed: false });
    assert_eq!(doc.entities[1].kind, EntityKind::pre(""));

    let plain: FormattedText = serde_json::from_value(json!({"text": "x"})).unwrap();
    assert_eq!(plain, FormattedText::plain("x"));
}

#[test]
fn test_unknown_type_rejected() {
    let result: Result<TextEntity, _> =
        serde_json::from_value(json!({"offset": 0, "length": 1, "type": "blink"}));
    assert!(result.is_err());
}
