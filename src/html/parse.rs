//! HTML parsing.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cursor::{self, Cursor};
use crate::entity::{self, EntityKind, FormattedText, TextEntity};
use crate::error::{Diagnostics, Warning};
use crate::escape;
use crate::limits::MAX_OPEN_TAGS;
use crate::utf16;

use super::tag::{self, Markup, TagInfo, TagKind};
use super::{HtmlDialect, HtmlTag};

/// Parse HTML-like markup into plain text and entities.
///
/// Unknown tags are dropped and their text kept. Malformed markup never
/// fails; see [`crate::parse_with_warnings`] to collect what was repaired.
///
/// # Example
/// ```
/// use entityfmt::html::{self, HtmlDialect};
/// use entityfmt::EntityKind;
///
/// let doc = html::parse("<b>a &amp; b</b>", &HtmlDialect::default());
/// assert_eq!(doc.text, "a & b");
/// assert_eq!(doc.entities[0].kind, EntityKind::Bold);
/// ```
pub fn parse(markup: &str, dialect: &HtmlDialect) -> FormattedText {
    let mut diag = Diagnostics::new();
    parse_into(markup, dialect, &mut diag)
}

pub(crate) fn parse_into(markup: &str, dialect: &HtmlDialect, diag: &mut Diagnostics) -> FormattedText {
    if markup.is_empty() {
        return FormattedText::plain(markup);
    }

    let mut state = ParseState::new(markup, dialect);
    let mut cursor = Cursor::new(markup);
    let mut text_start = 0;

    while let Some(rel) = cursor.find(b'<') {
        cursor.advance(rel);
        let lt = cursor.offset();
        let Some(item) = tag::scan_markup(cursor.remaining_slice().as_bytes()) else {
            // Literal `<`, stays part of the text run.
            cursor.bump();
            continue;
        };

        state.push_text(&markup[text_start..lt]);
        if let Markup::Tag(info) = &item {
            match info.kind {
                TagKind::Open => state.open(info, diag),
                TagKind::Close => state.close(&info.name, lt, diag),
                TagKind::SelfClosing => {
                    state.open(info, diag);
                    state.close(&info.name, lt, diag);
                }
            }
        }
        cursor.advance(item.end_offset());
        text_start = cursor.offset();
    }
    state.push_text(&markup[text_start..]);

    state.finish(diag)
}

/// An entity awaiting its close tag. `None` marks an open tag that was
/// ignored, so its close tag is swallowed quietly.
type Pending = Option<TextEntity>;

struct ParseState<'a> {
    markup: &'a str,
    dialect: &'a HtmlDialect,
    units: Vec<u16>,
    /// Open entities per tag name, innermost last.
    open: FxHashMap<String, SmallVec<[Pending; 2]>>,
    open_count: usize,
    entities: Vec<TextEntity>,
}

impl<'a> ParseState<'a> {
    fn new(markup: &'a str, dialect: &'a HtmlDialect) -> Self {
        Self {
            markup,
            dialect,
            units: Vec::with_capacity(markup.len()),
            open: FxHashMap::default(),
            open_count: 0,
            entities: Vec::new(),
        }
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.units.extend(escape::unescape(raw).encode_utf16());
    }

    fn open(&mut self, info: &TagInfo, diag: &mut Diagnostics) {
        let Some(tag) = self.dialect.tag(&info.name) else {
            tracing::trace!(tag = %info.name, "ignoring unknown html tag");
            return;
        };

        let pending = match self.kind_for(tag, info, diag) {
            Some(_) if self.open_count >= MAX_OPEN_TAGS => {
                diag.warn(Warning::TooManyOpenTags {
                    tag: info.name.clone(),
                });
                None
            }
            Some(kind) => {
                self.open_count += 1;
                Some(TextEntity::new(self.units.len() as u32, 0, kind))
            }
            None => None,
        };
        self.open.entry(info.name.clone()).or_default().push(pending);
    }

    fn kind_for(&self, tag: HtmlTag, info: &TagInfo, diag: &mut Diagnostics) -> Option<EntityKind> {
        let kind = match tag {
            HtmlTag::Bold => EntityKind::Bold,
            HtmlTag::Italic => EntityKind::Italic,
            HtmlTag::Underline => EntityKind::Underline,
            HtmlTag::Strike => EntityKind::Strike,
            HtmlTag::Spoiler => EntityKind::Spoiler,
            HtmlTag::Code => EntityKind::Code,
            HtmlTag::Pre => EntityKind::pre(info.attr("language").unwrap_or_default()),
            HtmlTag::Link => {
                let href = info.attr("href").unwrap_or_default();
                match self.dialect.mention_user_id(href) {
                    Some(user_id) => EntityKind::MentionName { user_id },
                    None => EntityKind::text_url(href),
                }
            }
            HtmlTag::CustomEmoji => {
                let raw = info.attr("document_id").unwrap_or_default();
                match raw.trim().parse() {
                    Ok(document_id) => EntityKind::CustomEmoji { document_id },
                    Err(_) => {
                        diag.warn(Warning::InvalidEmojiId(raw.to_owned()));
                        return None;
                    }
                }
            }
            HtmlTag::Blockquote => EntityKind::Blockquote {
                collapsed: info.has_attr("expandable"),
            },
        };
        Some(kind)
    }

    fn close(&mut self, name: &str, at: usize, diag: &mut Diagnostics) {
        if self.dialect.tag(name).is_none() {
            return;
        }

        let popped = self.open.get_mut(name).and_then(|stack| stack.pop());
        if self.open.get(name).is_some_and(|stack| stack.is_empty()) {
            self.open.remove(name);
        }

        match popped {
            Some(Some(mut entity)) => {
                self.open_count -= 1;
                entity.length = (self.units.len() - entity.offset_usize()) as u32;
                self.entities.push(entity);
            }
            Some(None) => {}
            None => {
                let (line, column) = cursor::line_column(self.markup, at);
                diag.warn(Warning::UnmatchedClosingTag {
                    tag: name.to_owned(),
                    line,
                    column,
                });
            }
        }
    }

    fn finish(mut self, diag: &mut Diagnostics) -> FormattedText {
        if !self.open.is_empty() {
            let mut unclosed: Vec<_> = self
                .open
                .iter()
                .map(|(tag, stack)| (tag.clone(), stack.len()))
                .collect();
            unclosed.sort();
            for (tag, count) in unclosed {
                diag.warn(Warning::UnclosedTag { tag, count });
            }
        }

        entity::strip_whitespace(&mut self.units, &mut self.entities);
        entity::sort_entities(&mut self.entities);
        FormattedText::new(utf16::from_offset_space(&self.units), self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(markup: &str) -> FormattedText {
        parse(markup, &HtmlDialect::default())
    }

    fn html_warn(markup: &str) -> (FormattedText, Vec<Warning>) {
        let mut diag = Diagnostics::new();
        let doc = parse_into(markup, &HtmlDialect::default(), &mut diag);
        (doc, diag.into_warnings())
    }

    #[test]
    fn test_basic_tags() {
        let doc = html("<b>bold</b> <i>it</i>");
        assert_eq!(doc.text, "bold it");
        assert_eq!(
            doc.entities,
            vec![
                TextEntity::new(0, 4, EntityKind::Bold),
                TextEntity::new(5, 2, EntityKind::Italic),
            ]
        );
    }

    #[test]
    fn test_aliases_and_case() {
        let doc = html("<STRONG>a</STRONG><em>b</em><del>c</del><ins>d</ins><tg-spoiler>e</tg-spoiler>");
        let kinds: Vec<_> = doc.entities.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Bold,
                EntityKind::Italic,
                EntityKind::Strike,
                EntityKind::Underline,
                EntityKind::Spoiler,
            ]
        );
    }

    #[test]
    fn test_same_tag_nesting() {
        let doc = html("<b>a<b>b</b>c</b>");
        assert_eq!(doc.text, "abc");
        assert_eq!(
            doc.entities,
            vec![
                TextEntity::new(0, 3, EntityKind::Bold),
                TextEntity::new(1, 1, EntityKind::Bold),
            ]
        );
    }

    #[test]
    fn test_attributes() {
        let doc = html(
            "<pre language=\"rust\">x</pre><a href=\"http://e.com\">l</a>\
             <a href=\"tg://user?id=42\">m</a><emoji document_id=\"5\">e</emoji>\
             <blockquote expandable>q</blockquote>",
        );
        let kinds: Vec<_> = doc.entities.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::pre("rust"),
                EntityKind::text_url("http://e.com"),
                EntityKind::MentionName { user_id: 42 },
                EntityKind::CustomEmoji { document_id: 5 },
                EntityKind::Blockquote { collapsed: true },
            ]
        );
    }

    #[test]
    fn test_unknown_tags_keep_text() {
        let (doc, warnings) = html_warn("<div>a <span>b</span></div>");
        assert_eq!(doc.text, "a b");
        assert!(doc.entities.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_unclosed_tag_dropped_with_warning() {
        let (doc, warnings) = html_warn("<b>bold");
        assert_eq!(doc.text, "bold");
        assert!(doc.entities.is_empty());
        assert_eq!(
            warnings,
            vec![Warning::UnclosedTag {
                tag: "b".into(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_unmatched_close_tag_position() {
        let (doc, warnings) = html_warn("ab\ncd</i>");
        assert_eq!(doc.text, "ab\ncd");
        assert_eq!(
            warnings,
            vec![Warning::UnmatchedClosingTag {
                tag: "i".into(),
                line: 2,
                column: 3
            }]
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let doc = html("<code>a &lt; b &amp;&amp; &#x1F600;</code>");
        assert_eq!(doc.text, "a < b && 😀");
        assert_eq!(doc.entities, vec![TextEntity::new(0, 11, EntityKind::Code)]);
    }

    #[test]
    fn test_literal_less_than() {
        let doc = html("1 < 2 <b>x</b>");
        assert_eq!(doc.text, "1 < 2 x");
        assert_eq!(doc.entities, vec![TextEntity::new(6, 1, EntityKind::Bold)]);
    }

    #[test]
    fn test_comments_and_self_closing_are_dropped() {
        let doc = html("a<!-- note --><b/>b");
        assert_eq!(doc.text, "ab");
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn test_invalid_emoji_ignored_quietly_on_close() {
        let (doc, warnings) = html_warn("<emoji document_id=\"x\">e</emoji>");
        assert_eq!(doc.text, "e");
        assert!(doc.entities.is_empty());
        assert_eq!(warnings, vec![Warning::InvalidEmojiId("x".into())]);
    }

    #[test]
    fn test_surrogate_lengths() {
        let doc = html("<b>😀</b>");
        assert_eq!(doc.entities, vec![TextEntity::new(0, 2, EntityKind::Bold)]);
    }

    #[test]
    fn test_trim_adjusts_entities() {
        let doc = html("  <b> x </b>  ");
        assert_eq!(doc.text, "x");
        assert_eq!(doc.entities, vec![TextEntity::new(0, 1, EntityKind::Bold)]);
    }

    #[test]
    fn test_too_many_open_tags() {
        let markup = format!("{}x{}", "<b>".repeat(MAX_OPEN_TAGS + 1), "</b>".repeat(MAX_OPEN_TAGS + 1));
        let (doc, warnings) = html_warn(&markup);
        assert_eq!(doc.entities.len(), MAX_OPEN_TAGS);
        assert_eq!(
            warnings,
            vec![Warning::TooManyOpenTags { tag: "b".into() }]
        );
    }
}
