//! HTML-like dialect.
//!
//! A small tag vocabulary (`<b>`, `<i>`, `<a href>`, `<pre language>`, ...)
//! mapped onto entity kinds through an [`HtmlDialect`] table. Unknown tags
//! are dropped while their text is kept.

mod parse;
pub(crate) mod tag;
mod unparse;
mod writer;

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::entity::EntityKind;

pub(crate) use parse::parse_into;
pub use parse::parse;
pub use unparse::unparse;
pub use writer::HtmlWriter;

/// The entity family a tag name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlTag {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Code,
    /// `language` attribute.
    Pre,
    /// `href` attribute; a mention URL yields `MentionName`.
    Link,
    /// `document_id` attribute.
    CustomEmoji,
    /// `expandable` attribute.
    Blockquote,
}

impl HtmlTag {
    /// The tag family that renders `kind`.
    pub fn for_kind(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Bold => Self::Bold,
            EntityKind::Italic => Self::Italic,
            EntityKind::Underline => Self::Underline,
            EntityKind::Strike => Self::Strike,
            EntityKind::Spoiler => Self::Spoiler,
            EntityKind::Code => Self::Code,
            EntityKind::Pre { .. } => Self::Pre,
            EntityKind::TextUrl { .. } | EntityKind::MentionName { .. } => Self::Link,
            EntityKind::CustomEmoji { .. } => Self::CustomEmoji,
            EntityKind::Blockquote { .. } => Self::Blockquote,
        }
    }

    /// Tag name understood by the default table.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
            Self::Strike => "s",
            Self::Spoiler => "spoiler",
            Self::Code => "code",
            Self::Pre => "pre",
            Self::Link => "a",
            Self::CustomEmoji => "emoji",
            Self::Blockquote => "blockquote",
        }
    }
}

/// Tag table for the HTML dialect.
///
/// Several names may map to one [`HtmlTag`]; the first name registered for
/// a tag is the one `unparse` emits.
#[derive(Debug, Clone)]
pub struct HtmlDialect {
    tags: FxHashMap<String, HtmlTag>,
    names: FxHashMap<HtmlTag, String>,
    mention_scheme: String,
}

impl HtmlDialect {
    /// A table with no tags and the `tg` mention scheme.
    pub fn empty() -> Self {
        Self {
            tags: FxHashMap::default(),
            names: FxHashMap::default(),
            mention_scheme: "tg".to_owned(),
        }
    }

    /// Map tag `name` (case-insensitive) to `tag`.
    pub fn with_tag(mut self, name: &str, tag: HtmlTag) -> Self {
        let name = name.to_ascii_lowercase();
        if name.is_empty() {
            tracing::debug!("ignoring empty html tag name");
            return self;
        }
        self.names.entry(tag).or_insert_with(|| name.clone());
        self.tags.insert(name, tag);
        self
    }

    /// Scheme of mention links, `<scheme>://user?id=<digits>`.
    pub fn with_mention_scheme(mut self, scheme: &str) -> Self {
        self.mention_scheme = scheme.to_owned();
        self
    }

    #[inline]
    pub fn tag(&self, name: &str) -> Option<HtmlTag> {
        self.tags.get(name).copied()
    }

    /// The name `unparse` emits for `tag`.
    #[inline]
    pub fn name_for(&self, tag: HtmlTag) -> Option<&str> {
        self.names.get(&tag).map(String::as_str)
    }

    #[inline]
    pub fn mention_scheme(&self) -> &str {
        &self.mention_scheme
    }

    /// User id of a mention URL, if `href` is one.
    pub fn mention_user_id(&self, href: &str) -> Option<i64> {
        let digits = href
            .strip_prefix(self.mention_scheme.as_str())?
            .strip_prefix("://user?id=")?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Mention URL for `user_id`.
    pub fn mention_url(&self, user_id: i64) -> String {
        format!("{}://user?id={user_id}", self.mention_scheme)
    }
}

impl Default for HtmlDialect {
    fn default() -> Self {
        Self::empty()
            .with_tag("b", HtmlTag::Bold)
            .with_tag("strong", HtmlTag::Bold)
            .with_tag("i", HtmlTag::Italic)
            .with_tag("em", HtmlTag::Italic)
            .with_tag("u", HtmlTag::Underline)
            .with_tag("ins", HtmlTag::Underline)
            .with_tag("s", HtmlTag::Strike)
            .with_tag("del", HtmlTag::Strike)
            .with_tag("strike", HtmlTag::Strike)
            .with_tag("spoiler", HtmlTag::Spoiler)
            .with_tag("tg-spoiler", HtmlTag::Spoiler)
            .with_tag("code", HtmlTag::Code)
            .with_tag("pre", HtmlTag::Pre)
            .with_tag("a", HtmlTag::Link)
            .with_tag("emoji", HtmlTag::CustomEmoji)
            .with_tag("tg-emoji", HtmlTag::CustomEmoji)
            .with_tag("blockquote", HtmlTag::Blockquote)
    }
}

static DEFAULT_DIALECT: LazyLock<HtmlDialect> = LazyLock::new(HtmlDialect::default);

/// The shared default table.
pub fn default_dialect() -> &'static HtmlDialect {
    &DEFAULT_DIALECT
}
