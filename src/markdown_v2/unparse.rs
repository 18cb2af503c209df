//! MarkdownV2 rendering.

use std::borrow::Cow;

use crate::entity::{self, EntityKind, TextEntity};
use crate::error::Result;
use crate::escape;
use crate::html::HtmlTag;
use crate::utf16;

use super::{EMOJI_URL_PREFIX, MENTION_URL_PREFIX, MarkdownV2Dialect};

/// Insertions at one position are ordered by class first: spans ending
/// there close, then a collapsed quote ends, then quote markers start the
/// line, then spans starting there open.
const CLASS_CLOSE: u8 = 0;
const CLASS_QUOTE_END: u8 = 1;
const CLASS_QUOTE_START: u8 = 2;
const CLASS_OPEN: u8 = 3;

struct Insertion<'a> {
    pos: usize,
    class: u8,
    ordinal: usize,
    token: Cow<'a, str>,
}

/// Render text and entities as MarkdownV2 markup.
///
/// A blockquote is written as `>> ` line prefixes, or wrapped in `^^ ... !^^`
/// when collapsed. Quotes are line-oriented, so one that starts or ends
/// mid-line does not survive a round trip.
///
/// # Example
/// ```
/// use entityfmt::markdown_v2::{self, MarkdownV2Dialect};
/// use entityfmt::{EntityKind, TextEntity};
///
/// let entities = [TextEntity::new(0, 3, EntityKind::Blockquote { collapsed: false })];
/// let out = markdown_v2::unparse("a\nb", &entities, &MarkdownV2Dialect::default()).unwrap();
/// assert_eq!(out, ">> a\n>> b");
/// ```
pub fn unparse(text: &str, entities: &[TextEntity], dialect: &MarkdownV2Dialect) -> Result<String> {
    if text.is_empty() || entities.is_empty() {
        return Ok(text.to_owned());
    }

    let units = utf16::to_offset_space(text);
    entity::validate_bounds(entities, units.len())?;

    let mut sorted = entities.to_vec();
    entity::sort_entities(&mut sorted);

    let n = sorted.len();
    let mut insertions: Vec<Insertion<'_>> = Vec::with_capacity(n * 2);
    for (i, entity) in sorted.iter().enumerate() {
        if let EntityKind::Blockquote { collapsed } = entity.kind {
            quote_insertions(&mut insertions, &units, entity, collapsed, dialect);
            continue;
        }
        if entity.length == 0 {
            continue;
        }
        let Some((open, close)) = tokens_for(&entity.kind, dialect) else {
            tracing::trace!(kind = entity.kind.name(), "no markdown_v2 syntax for entity, skipping");
            continue;
        };
        insertions.push(Insertion {
            pos: entity.offset_usize(),
            class: CLASS_OPEN,
            ordinal: i,
            token: open,
        });
        insertions.push(Insertion {
            pos: entity.end_usize(),
            class: CLASS_CLOSE,
            ordinal: n - i,
            token: close,
        });
    }
    insertions.sort_by_key(|ins| (ins.pos, ins.class, ins.ordinal));

    let strict = dialect.is_strict();
    let mut out = String::with_capacity(text.len() + insertions.len() * 3);
    let mut last = 0;
    let push_text = |out: &mut String, from: usize, to: usize| {
        if to > from {
            let run = utf16::from_offset_space(&units[from..to]);
            if strict {
                out.push_str(&run);
            } else {
                out.push_str(&escape::escape_text(&run));
            }
        }
    };
    for ins in &insertions {
        let at = utf16::nudge_out_of_surrogate(&units, ins.pos);
        push_text(&mut out, last, at);
        out.push_str(&ins.token);
        last = last.max(at);
    }
    push_text(&mut out, last, units.len());
    Ok(out)
}

fn tokens_for<'a>(kind: &EntityKind, dialect: &'a MarkdownV2Dialect) -> Option<(Cow<'a, str>, Cow<'a, str>)> {
    let toggle = |tag: HtmlTag| {
        dialect
            .token_for(tag)
            .map(|t| (Cow::Borrowed(t), Cow::Borrowed(t)))
    };
    match kind {
        EntityKind::Bold => toggle(HtmlTag::Bold),
        EntityKind::Italic => toggle(HtmlTag::Italic),
        EntityKind::Underline => toggle(HtmlTag::Underline),
        EntityKind::Strike => toggle(HtmlTag::Strike),
        EntityKind::Spoiler => toggle(HtmlTag::Spoiler),
        EntityKind::Code => toggle(HtmlTag::Code),
        EntityKind::Pre { language } => {
            let fence = dialect.token_for(HtmlTag::Pre)?;
            Some((
                Cow::Owned(format!("{fence}{language}\n")),
                Cow::Owned(format!("\n{fence}")),
            ))
        }
        EntityKind::TextUrl { url } => Some((Cow::Borrowed("["), Cow::Owned(format!("]({url})")))),
        EntityKind::MentionName { user_id } => Some((
            Cow::Borrowed("["),
            Cow::Owned(format!("]({MENTION_URL_PREFIX}{user_id})")),
        )),
        EntityKind::CustomEmoji { document_id } => Some((
            Cow::Borrowed("!["),
            Cow::Owned(format!("]({EMOJI_URL_PREFIX}{document_id})")),
        )),
        EntityKind::Blockquote { .. } => None,
    }
}

/// `>> ` at the start of every line of the quote, or `^^` and `!^^` around
/// a collapsed one.
fn quote_insertions<'a>(
    insertions: &mut Vec<Insertion<'a>>,
    units: &[u16],
    entity: &TextEntity,
    collapsed: bool,
    dialect: &'a MarkdownV2Dialect,
) {
    let start = entity.offset_usize();
    let end = entity.end_usize();

    if collapsed {
        insertions.push(Insertion {
            pos: start,
            class: CLASS_QUOTE_START,
            ordinal: 0,
            token: Cow::Borrowed(dialect.expandable_open()),
        });
        insertions.push(Insertion {
            pos: end,
            class: CLASS_QUOTE_END,
            ordinal: 0,
            token: Cow::Borrowed(dialect.expandable_close()),
        });
        return;
    }

    let prefix: Cow<'a, str> = Cow::Owned(format!("{} ", dialect.quote_prefix()));
    let newline = u16::from(b'\n');
    let line_starts = std::iter::once(start).chain(
        units[start..end]
            .iter()
            .enumerate()
            .filter(|&(_, &u)| u == newline)
            .map(|(i, _)| start + i + 1)
            .filter(|&p| p < end),
    );
    for pos in line_starts {
        insertions.push(Insertion {
            pos,
            class: CLASS_QUOTE_START,
            ordinal: 0,
            token: prefix.clone(),
        });
    }
}
