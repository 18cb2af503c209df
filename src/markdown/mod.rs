//! Markdown-like dialect.
//!
//! Symmetric delimiters (`**bold**`, `__italic__`, ...) plus a link syntax
//! `[label](target)`. There is no escaping mechanism: a delimiter without a
//! closing counterpart is literal text.
//!
//! The delimiter table is a [`MarkdownDialect`] value, so callers can swap
//! tokens without touching the engine:
//!
//! ```
//! use entityfmt::markdown::{self, MarkdownDialect};
//! use entityfmt::EntityKind;
//!
//! let dialect = MarkdownDialect::empty().with_delimiter("++", EntityKind::Underline);
//! let doc = markdown::parse("++under++", &dialect);
//! assert_eq!(doc.text, "under");
//! assert_eq!(doc.entities[0].kind, EntityKind::Underline);
//! ```

mod parse;
mod unparse;

use std::mem::Discriminant;

use rustc_hash::FxHashMap;

use crate::entity::EntityKind;
use crate::utf16;

pub(crate) use parse::parse_into;
pub use parse::parse;
pub use unparse::unparse;

/// Link target that turns `[label](spoiler)` into a spoiler.
pub const SPOILER_TARGET: &str = "spoiler";

/// Link target prefix that turns `[label](emoji/<id>)` into a custom emoji.
pub const EMOJI_TARGET_PREFIX: &str = "emoji/";

/// One delimiter token and the entity it produces.
#[derive(Debug, Clone)]
pub(crate) struct Delimiter {
    token: String,
    units: Box<[u16]>,
    kind: EntityKind,
}

impl Delimiter {
    #[inline]
    pub(crate) fn units(&self) -> &[u16] {
        &self.units
    }

    #[inline]
    pub(crate) fn kind(&self) -> &EntityKind {
        &self.kind
    }
}

/// Delimiter table for the Markdown dialect.
#[derive(Debug, Clone)]
pub struct MarkdownDialect {
    /// Sorted longest token first, so "```" wins over "`".
    delimiters: Vec<Delimiter>,
    /// Token used when rendering a kind; the first registration wins.
    by_kind: FxHashMap<Discriminant<EntityKind>, String>,
    links: bool,
}

impl MarkdownDialect {
    /// A table with no delimiters and link syntax enabled.
    pub fn empty() -> Self {
        Self {
            delimiters: Vec::new(),
            by_kind: FxHashMap::default(),
            links: true,
        }
    }

    /// Register `token` as the delimiter for `kind`.
    ///
    /// The kind is a template: `Pre` gets its language from the markup, and
    /// `Blockquote { collapsed }` keeps the flag given here. Link-like kinds
    /// (`TextUrl`, `MentionName`, `CustomEmoji`) carry a payload a symmetric
    /// token cannot express and are ignored.
    pub fn with_delimiter(mut self, token: &str, kind: EntityKind) -> Self {
        if token.is_empty() {
            tracing::debug!("ignoring empty markdown delimiter");
            return self;
        }
        if matches!(
            kind,
            EntityKind::TextUrl { .. } | EntityKind::MentionName { .. } | EntityKind::CustomEmoji { .. }
        ) {
            tracing::debug!(token, kind = kind.name(), "link-like kinds cannot be delimiters");
            return self;
        }

        self.by_kind
            .entry(std::mem::discriminant(&kind))
            .or_insert_with(|| token.to_owned());
        self.delimiters.retain(|d| d.token != token);
        self.delimiters.push(Delimiter {
            token: token.to_owned(),
            units: utf16::to_offset_space(token).into_boxed_slice(),
            kind,
        });
        self.delimiters
            .sort_by(|a, b| b.units.len().cmp(&a.units.len()));
        self
    }

    /// Enable or disable the `[label](target)` syntax.
    pub fn link_syntax(mut self, enabled: bool) -> Self {
        self.links = enabled;
        self
    }

    #[inline]
    pub fn links_enabled(&self) -> bool {
        self.links
    }

    /// Registered tokens, longest first.
    pub fn delimiters(&self) -> impl Iterator<Item = (&str, &EntityKind)> {
        self.delimiters.iter().map(|d| (d.token.as_str(), &d.kind))
    }

    /// The token that renders `kind`, if any.
    pub fn delimiter_for(&self, kind: &EntityKind) -> Option<&str> {
        self.by_kind
            .get(&std::mem::discriminant(kind))
            .map(String::as_str)
    }

    #[inline]
    pub(crate) fn has_delimiters(&self) -> bool {
        !self.delimiters.is_empty()
    }

    /// Longest delimiter starting at `pos`.
    #[inline]
    pub(crate) fn match_at(&self, text: &[u16], pos: usize) -> Option<&Delimiter> {
        self.delimiters
            .iter()
            .find(|d| utf16::starts_with_at(text, pos, &d.units))
    }
}

impl Default for MarkdownDialect {
    fn default() -> Self {
        Self::empty()
            .with_delimiter("**", EntityKind::Bold)
            .with_delimiter("__", EntityKind::Italic)
            .with_delimiter("~~", EntityKind::Strike)
            .with_delimiter("`", EntityKind::Code)
            .with_delimiter("```", EntityKind::pre(""))
            .with_delimiter("||", EntityKind::Spoiler)
            .with_delimiter("^^", EntityKind::Blockquote { collapsed: true })
    }
}
