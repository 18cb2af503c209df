//! Formatting entities and the documents they annotate.
//!
//! Offsets and lengths are UTF-16 code units (see [`crate::utf16`]).
//! Like the rest of the crate they are stored as `u32`, which caps a single
//! message at 4G code units.

use crate::error::{Error, Result};
use crate::utf16;

/// The kind of a formatting span, carrying its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EntityKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Code,
    /// Preformatted block. `language` is empty when none was given.
    Pre {
        #[cfg_attr(feature = "serde", serde(default))]
        language: String,
    },
    TextUrl {
        url: String,
    },
    MentionName {
        user_id: i64,
    },
    CustomEmoji {
        document_id: i64,
    },
    Blockquote {
        #[cfg_attr(feature = "serde", serde(default))]
        collapsed: bool,
    },
}

impl EntityKind {
    /// `Pre` with the given language.
    pub fn pre(language: impl Into<String>) -> Self {
        Self::Pre {
            language: language.into(),
        }
    }

    /// `TextUrl` pointing at `url`.
    pub fn text_url(url: impl Into<String>) -> Self {
        Self::TextUrl { url: url.into() }
    }

    /// Code and Pre spans never contain other entities.
    #[inline]
    pub fn is_fixed_width(&self) -> bool {
        matches!(self, Self::Code | Self::Pre { .. })
    }

    /// Short lowercase name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Strike => "strike",
            Self::Spoiler => "spoiler",
            Self::Code => "code",
            Self::Pre { .. } => "pre",
            Self::TextUrl { .. } => "text_url",
            Self::MentionName { .. } => "mention_name",
            Self::CustomEmoji { .. } => "custom_emoji",
            Self::Blockquote { .. } => "blockquote",
        }
    }
}

/// A formatting span over plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextEntity {
    /// Start, in UTF-16 code units.
    pub offset: u32,
    /// Length, in UTF-16 code units.
    pub length: u32,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: EntityKind,
}

impl TextEntity {
    #[inline]
    pub fn new(offset: u32, length: u32, kind: EntityKind) -> Self {
        Self {
            offset,
            length,
            kind,
        }
    }

    /// End position (exclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset.saturating_add(self.length)
    }

    #[inline]
    pub(crate) fn offset_usize(&self) -> usize {
        self.offset as usize
    }

    #[inline]
    pub(crate) fn end_usize(&self) -> usize {
        self.offset as usize + self.length as usize
    }
}

/// Plain text plus the entities that format it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormattedText {
    pub text: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entities: Vec<TextEntity>,
}

impl FormattedText {
    pub fn new(text: impl Into<String>, entities: Vec<TextEntity>) -> Self {
        Self {
            text: text.into(),
            entities,
        }
    }

    /// Text without any formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// Sort by `(offset ascending, length descending)`, so an outer span comes
/// before an inner span starting at the same offset. Stable.
pub fn sort_entities(entities: &mut [TextEntity]) {
    entities.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.length.cmp(&a.length)));
}

/// Check that every entity lies inside a text of `text_len` units.
pub fn validate_bounds(entities: &[TextEntity], text_len: usize) -> Result<()> {
    for entity in entities {
        if entity.end_usize() > text_len {
            return Err(Error::InvalidEntity {
                offset: entity.offset,
                length: entity.length,
                text_len,
            });
        }
    }
    Ok(())
}

/// Trim surrounding whitespace from `units` and move the entities along.
///
/// Zero-length entities are dropped, entities lying entirely inside the
/// trimmed whitespace are dropped, and entities straddling a trimmed edge
/// are clipped to the remaining text.
pub fn strip_whitespace(units: &mut Vec<u16>, entities: &mut Vec<TextEntity>) {
    let leading = units
        .iter()
        .take_while(|&&u| utf16::is_whitespace_unit(u))
        .count();
    let trailing = units[leading..]
        .iter()
        .rev()
        .take_while(|&&u| utf16::is_whitespace_unit(u))
        .count();
    let final_len = units.len() - leading - trailing;
    units.truncate(units.len() - trailing);
    units.drain(..leading);

    let leading = leading as u32;
    let final_len = final_len as u32;
    entities.retain_mut(|e| {
        if e.length == 0 || e.end() <= leading {
            return false;
        }
        if e.offset >= leading {
            e.offset -= leading;
        } else {
            e.length = e.end() - leading;
            e.offset = 0;
        }
        if e.offset >= final_len {
            return false;
        }
        if e.end() > final_len {
            e.length = final_len - e.offset;
        }
        true
    });
}
