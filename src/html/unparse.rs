//! HTML rendering.
//!
//! Entities are rendered as a properly nested tag tree. The walk keeps an
//! explicit stack of open tags instead of recursing, so deep nesting cannot
//! overflow the call stack.

use std::cmp::Reverse;

use smallvec::SmallVec;

use crate::entity::{self, EntityKind, TextEntity};
use crate::error::Result;
use crate::utf16;

use super::{HtmlDialect, HtmlTag, HtmlWriter};

/// Render text and entities as HTML markup.
///
/// An entity that starts inside another but extends past its end is split
/// at the parent's end, so the output is always well-formed.
///
/// # Example
/// ```
/// use entityfmt::html::{self, HtmlDialect};
/// use entityfmt::{EntityKind, TextEntity};
///
/// let entities = [TextEntity::new(0, 5, EntityKind::Bold)];
/// let out = html::unparse("a < b", &entities, &HtmlDialect::default()).unwrap();
/// assert_eq!(out, "<b>a &lt; b</b>");
/// ```
pub fn unparse(text: &str, entities: &[TextEntity], dialect: &HtmlDialect) -> Result<String> {
    if text.is_empty() || entities.is_empty() {
        return Ok(text.to_owned());
    }

    let units = utf16::to_offset_space(text);
    entity::validate_bounds(entities, units.len())?;

    let mut pending: Vec<TextEntity> = entities
        .iter()
        .filter(|e| e.length > 0)
        .filter(|e| {
            let known = dialect.name_for(HtmlTag::for_kind(&e.kind)).is_some();
            if !known {
                tracing::trace!(kind = e.kind.name(), "no html tag for entity, skipping");
            }
            known
        })
        .cloned()
        .collect();
    entity::sort_entities(&mut pending);

    let mut out = TextRuns::new(&units);
    let mut stack: SmallVec<[(usize, &str); 8]> = SmallVec::new();

    let mut idx = 0;
    while idx < pending.len() {
        let entity = pending[idx].clone();
        idx += 1;
        let start = entity.offset_usize();

        while let Some(&(end, name)) = stack.last() {
            if end > start {
                break;
            }
            out.text_to(end);
            out.writer.close_tag(name);
            stack.pop();
        }

        let mut end = entity.end_usize();
        if let Some(&(parent_end, _)) = stack.last() {
            if end > parent_end {
                let rest = TextEntity::new(
                    parent_end as u32,
                    (end - parent_end) as u32,
                    entity.kind.clone(),
                );
                let key = (rest.offset, Reverse(rest.length));
                let at = idx + pending[idx..].partition_point(|e| (e.offset, Reverse(e.length)) <= key);
                pending.insert(at, rest);
                end = parent_end;
            }
        }

        let Some(name) = dialect.name_for(HtmlTag::for_kind(&entity.kind)) else {
            continue;
        };
        out.text_to(start);
        write_open_tag(&mut out.writer, name, &entity.kind, dialect);
        stack.push((end, name));
    }

    while let Some((end, name)) = stack.pop() {
        out.text_to(end);
        out.writer.close_tag(name);
    }
    out.text_to(units.len());

    Ok(out.writer.into_string())
}

fn write_open_tag(writer: &mut HtmlWriter, name: &str, kind: &EntityKind, dialect: &HtmlDialect) {
    writer.open_tag_start(name);
    match kind {
        EntityKind::Pre { language } if !language.is_empty() => writer.attr("language", language),
        EntityKind::TextUrl { url } => writer.attr("href", url),
        EntityKind::MentionName { user_id } => writer.attr("href", &dialect.mention_url(*user_id)),
        EntityKind::CustomEmoji { document_id } => writer.attr_i64("document_id", *document_id),
        EntityKind::Blockquote { collapsed: true } => writer.flag("expandable"),
        _ => {}
    }
    writer.open_tag_end();
}

/// Escaped text output that tracks how far into the text it has written.
struct TextRuns<'u> {
    units: &'u [u16],
    written: usize,
    writer: HtmlWriter,
}

impl<'u> TextRuns<'u> {
    fn new(units: &'u [u16]) -> Self {
        Self {
            units,
            written: 0,
            writer: HtmlWriter::with_capacity_for(units.len()),
        }
    }

    /// Write the text up to unit `pos`, never stopping inside a pair.
    fn text_to(&mut self, pos: usize) {
        let pos = utf16::nudge_out_of_surrogate(self.units, pos);
        if pos > self.written {
            let run = utf16::from_offset_space(&self.units[self.written..pos]);
            self.writer.write_escaped_text(&run);
            self.written = pos;
        }
    }
}
