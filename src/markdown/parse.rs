//! Markdown parsing.
//!
//! The scan rewrites a UTF-16 buffer in place. Every time a delimiter is
//! spliced out, the entities recorded so far are shrunk by their overlap
//! with the removed range, which keeps nested offsets exact without a
//! second pass.

use crate::entity::{self, EntityKind, FormattedText, TextEntity};
use crate::error::{Diagnostics, Warning};
use crate::limits::MAX_LANGUAGE_LEN;
use crate::utf16;

use super::{EMOJI_TARGET_PREFIX, MarkdownDialect, SPOILER_TARGET};

const NEWLINE: u16 = b'\n' as u16;
const OPEN_BRACKET: u16 = b'[' as u16;
const CLOSE_BRACKET: u16 = b']' as u16;
const OPEN_PAREN: u16 = b'(' as u16;
const CLOSE_PAREN: u16 = b')' as u16;

/// Parse Markdown markup into plain text and entities.
///
/// Malformed markup never fails: an unmatched delimiter stays in the text
/// as a literal.
///
/// # Example
/// ```
/// use entityfmt::markdown::{self, MarkdownDialect};
///
/// let doc = markdown::parse("**bold** and __italic__", &MarkdownDialect::default());
/// assert_eq!(doc.text, "bold and italic");
/// assert_eq!(doc.entities.len(), 2);
/// ```
pub fn parse(markup: &str, dialect: &MarkdownDialect) -> FormattedText {
    let mut diag = Diagnostics::new();
    parse_into(markup, dialect, &mut diag)
}

pub(crate) fn parse_into(
    markup: &str,
    dialect: &MarkdownDialect,
    diag: &mut Diagnostics,
) -> FormattedText {
    if markup.is_empty() || (!dialect.has_delimiters() && !dialect.links_enabled()) {
        return FormattedText::plain(markup);
    }

    let mut units = utf16::to_offset_space(markup);
    let mut entities: Vec<TextEntity> = Vec::new();
    let mut i = 0;

    while i < units.len() {
        if let Some(delim) = dialect.match_at(&units, i) {
            let len = delim.units().len();
            // +1 so that "****" is not an empty span.
            let Some(close) = utf16::find_units(&units, delim.units(), i + len + 1) else {
                diag.warn(Warning::UnmatchedDelimiter {
                    delimiter: utf16::from_offset_space(delim.units()),
                    offset: i,
                });
                i += 1;
                continue;
            };

            remove_range(&mut units, &mut entities, i, len);
            let content_end = close - len;
            remove_range(&mut units, &mut entities, content_end, len);

            match delim.kind() {
                EntityKind::Pre { .. } => {
                    i = finish_pre(&mut units, &mut entities, i, content_end);
                }
                kind if kind.is_fixed_width() => {
                    entities.push(span(i, content_end, kind.clone()));
                    i = content_end;
                }
                kind => {
                    // Rescan from the content start so nested spans are found.
                    entities.push(span(i, content_end, kind.clone()));
                }
            }
            continue;
        }

        if dialect.links_enabled() {
            if let Some((label_end, close)) = match_link(&units, i) {
                let target = utf16::from_offset_space(&units[label_end + 2..close]);
                let kind = link_kind(target, diag);
                let label_len = label_end - i - 1;

                remove_range(&mut units, &mut entities, i, 1);
                remove_range(&mut units, &mut entities, i + label_len, close - label_end + 1);
                entities.push(span(i, i + label_len, kind));
                i += label_len;
                continue;
            }
        }

        i += 1;
    }

    entity::strip_whitespace(&mut units, &mut entities);
    entity::sort_entities(&mut entities);
    FormattedText::new(utf16::from_offset_space(&units), entities)
}

#[inline]
fn span(start: usize, end: usize, kind: EntityKind) -> TextEntity {
    TextEntity::new(start as u32, (end - start) as u32, kind)
}

/// Splice `units[start..start + len]` out and shrink every recorded entity
/// by its overlap with the removed range.
fn remove_range(units: &mut Vec<u16>, entities: &mut [TextEntity], start: usize, len: usize) {
    if len == 0 {
        return;
    }
    let end = start + len;
    units.drain(start..end);

    let shift = |p: usize| {
        if p <= start {
            p
        } else if p < end {
            start
        } else {
            p - len
        }
    };
    for entity in entities {
        let s = shift(entity.offset_usize());
        let e = shift(entity.end_usize());
        entity.offset = s as u32;
        entity.length = (e - s) as u32;
    }
}

/// Lift the language line out of a freshly closed fence and record the
/// `Pre` entity. Returns where the scan resumes.
fn finish_pre(
    units: &mut Vec<u16>,
    entities: &mut Vec<TextEntity>,
    start: usize,
    content_end: usize,
) -> usize {
    let mut end = content_end;
    let mut language = String::new();

    if let Some(nl) = utf16::find_unit(units, NEWLINE, start, end) {
        if end - nl > 1 && nl - start <= MAX_LANGUAGE_LEN {
            language = utf16::from_offset_space(&units[start..nl]);
            let header = nl + 1 - start;
            remove_range(units, entities, start, header);
            end -= header;

            if end > start && units[end - 1] == NEWLINE {
                remove_range(units, entities, end - 1, 1);
                end -= 1;
            }
        }
    }

    entities.push(span(start, end, EntityKind::Pre { language }));
    end
}

/// Match `[label](target)` at `pos`. Returns the positions of `]` and `)`.
///
/// The label runs to the first `]`, which must be followed by `(`; the
/// target runs to the first `)` after it.
fn match_link(units: &[u16], pos: usize) -> Option<(usize, usize)> {
    if units.get(pos) != Some(&OPEN_BRACKET) {
        return None;
    }
    let label_end = utf16::find_unit(units, CLOSE_BRACKET, pos + 1, units.len())?;
    if units.get(label_end + 1) != Some(&OPEN_PAREN) {
        return None;
    }
    let close = utf16::find_unit(units, CLOSE_PAREN, label_end + 2, units.len())?;
    Some((label_end, close))
}

fn link_kind(target: String, diag: &mut Diagnostics) -> EntityKind {
    if target == SPOILER_TARGET {
        return EntityKind::Spoiler;
    }
    if let Some(rest) = target.strip_prefix(EMOJI_TARGET_PREFIX) {
        let id = rest.split('/').next().unwrap_or(rest);
        match id.parse::<i64>() {
            Ok(document_id) => return EntityKind::CustomEmoji { document_id },
            Err(_) => diag.warn(Warning::InvalidEmojiId(rest.to_owned())),
        }
    }
    EntityKind::TextUrl { url: target }
}
