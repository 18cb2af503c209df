//! Markdown rendering.

use std::borrow::Cow;

use crate::entity::{self, EntityKind, TextEntity};
use crate::error::Result;
use crate::utf16;

use super::{EMOJI_TARGET_PREFIX, MarkdownDialect, SPOILER_TARGET};

/// Link target used for `MentionName` entities.
const MENTION_URL_PREFIX: &str = "tg://user?id=";

/// A token to insert into the text before unit `pos`.
///
/// At one position every close token comes before every open token, so a
/// span ending there is finished before the next one starts. Closes run
/// innermost first and opens outermost first.
struct Insertion<'a> {
    pos: usize,
    opens: bool,
    ordinal: usize,
    token: Cow<'a, str>,
}

/// Render text and entities as Markdown markup.
///
/// Entities whose kind the dialect cannot express (underline with the
/// default table) are skipped. Fails only when an entity reaches past the
/// end of `text`.
///
/// # Example
/// ```
/// use entityfmt::markdown::{self, MarkdownDialect};
/// use entityfmt::{EntityKind, TextEntity};
///
/// let entities = [TextEntity::new(0, 4, EntityKind::Bold)];
/// let out = markdown::unparse("bold text", &entities, &MarkdownDialect::default()).unwrap();
/// assert_eq!(out, "**bold** text");
/// ```
pub fn unparse(text: &str, entities: &[TextEntity], dialect: &MarkdownDialect) -> Result<String> {
    if text.is_empty() || entities.is_empty() {
        return Ok(text.to_owned());
    }

    let units = utf16::to_offset_space(text);
    entity::validate_bounds(entities, units.len())?;

    let mut sorted = entities.to_vec();
    entity::sort_entities(&mut sorted);

    let n = sorted.len();
    let mut insertions = Vec::with_capacity(n * 2);
    for (i, entity) in sorted.iter().enumerate() {
        if entity.length == 0 {
            continue;
        }
        let Some((open, close)) = tokens_for(&entity.kind, dialect) else {
            tracing::trace!(kind = entity.kind.name(), "no markdown syntax for entity, skipping");
            continue;
        };
        insertions.push(Insertion {
            pos: entity.offset_usize(),
            opens: true,
            ordinal: i,
            token: open,
        });
        insertions.push(Insertion {
            pos: entity.end_usize(),
            opens: false,
            ordinal: n - i,
            token: close,
        });
    }
    insertions.sort_by_key(|ins| (ins.pos, ins.opens, ins.ordinal));

    let extra: usize = insertions.iter().map(|ins| ins.token.len()).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut last = 0;
    for ins in &insertions {
        let at = utf16::nudge_out_of_surrogate(&units, ins.pos);
        out.push_str(&utf16::from_offset_space(&units[last..at]));
        out.push_str(&ins.token);
        last = at;
    }
    out.push_str(&utf16::from_offset_space(&units[last..]));
    Ok(out)
}

fn tokens_for<'a>(
    kind: &EntityKind,
    dialect: &'a MarkdownDialect,
) -> Option<(Cow<'a, str>, Cow<'a, str>)> {
    let link = |target: String| -> Option<(Cow<'a, str>, Cow<'a, str>)> {
        dialect
            .links_enabled()
            .then(|| (Cow::Borrowed("["), Cow::Owned(format!("]({target})"))))
    };

    match kind {
        EntityKind::TextUrl { url } => link(url.clone()),
        EntityKind::MentionName { user_id } => link(format!("{MENTION_URL_PREFIX}{user_id}")),
        EntityKind::CustomEmoji { document_id } => {
            link(format!("{EMOJI_TARGET_PREFIX}{document_id}"))
        }
        EntityKind::Pre { language } => {
            let fence = dialect.delimiter_for(kind)?;
            Some((
                Cow::Owned(format!("{fence}{language}\n")),
                Cow::Owned(format!("\n{fence}")),
            ))
        }
        EntityKind::Spoiler => match dialect.delimiter_for(kind) {
            Some(d) => Some((Cow::Borrowed(d), Cow::Borrowed(d))),
            None => link(SPOILER_TARGET.to_owned()),
        },
        _ => dialect
            .delimiter_for(kind)
            .map(|d| (Cow::Borrowed(d), Cow::Borrowed(d))),
    }
}
