//! MarkdownV2 dialect.
//!
//! Parsing lowers the markup onto the HTML dialect in two passes and hands
//! the result to the HTML engine:
//!
//! 1. [`quote`] collapses `>>` line runs and `^^ ... !^^` blocks into
//!    `<blockquote>` elements.
//! 2. [`toggle`] rewrites toggle delimiters (`**`, `__`, ...) and link
//!    syntax into tags.
//!
//! Without `strict`, markup may also contain HTML tags directly, and plain
//! `<`/`&` must be written as character references.

mod quote;
mod toggle;
mod unparse;

use crate::entity::FormattedText;
use crate::error::Diagnostics;
use crate::html::{self, HtmlTag};

pub use unparse::unparse;

/// Link target prefix of custom emoji, `![label](tg://emoji?id=<n>)`.
pub const EMOJI_URL_PREFIX: &str = "tg://emoji?id=";

/// Link target prefix of mentions, `[label](tg://user?id=<n>)`.
pub const MENTION_URL_PREFIX: &str = "tg://user?id=";

/// Token table for the MarkdownV2 dialect.
#[derive(Debug, Clone)]
pub struct MarkdownV2Dialect {
    /// Longest first.
    toggles: Vec<(String, HtmlTag)>,
    quote_prefix: String,
    expandable_open: String,
    expandable_close: String,
    strict: bool,
}

impl MarkdownV2Dialect {
    /// A table with no toggles and the default quote shorthands.
    pub fn empty() -> Self {
        Self {
            toggles: Vec::new(),
            quote_prefix: ">>".to_owned(),
            expandable_open: "^^".to_owned(),
            expandable_close: "!^^".to_owned(),
            strict: false,
        }
    }

    /// Register a toggle delimiter.
    ///
    /// Only inline tags can toggle; links, custom emoji and blockquotes
    /// have their own syntax and are ignored here.
    pub fn with_toggle(mut self, token: &str, tag: HtmlTag) -> Self {
        if token.is_empty() {
            tracing::debug!("ignoring empty markdown_v2 toggle");
            return self;
        }
        if matches!(tag, HtmlTag::Link | HtmlTag::CustomEmoji | HtmlTag::Blockquote) {
            tracing::debug!(token, ?tag, "tag cannot be a toggle");
            return self;
        }
        self.toggles.retain(|(t, _)| t != token);
        self.toggles.push((token.to_owned(), tag));
        self.toggles.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Line prefix of plain quotes (default `>>`).
    pub fn with_quote_prefix(mut self, prefix: &str) -> Self {
        self.quote_prefix = prefix.to_owned();
        self
    }

    /// Open and close markers of expandable quotes (default `^^`/`!^^`).
    pub fn with_expandable_markers(mut self, open: &str, close: &str) -> Self {
        self.expandable_open = open.to_owned();
        self.expandable_close = close.to_owned();
        self
    }

    /// In strict mode every line is HTML-escaped before the toggle pass, so
    /// literal `<` and `&` never form tags or references.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The toggle that renders `tag`. With several tokens for one tag, the
    /// longest wins.
    pub fn token_for(&self, tag: HtmlTag) -> Option<&str> {
        self.toggles
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(token, _)| token.as_str())
    }

    /// Longest toggle at the start of `rest`.
    #[inline]
    pub(crate) fn toggle_at<'s>(&'s self, rest: &str) -> Option<(&'s str, HtmlTag)> {
        self.toggles
            .iter()
            .find(|(token, _)| rest.starts_with(token.as_str()))
            .map(|(token, tag)| (token.as_str(), *tag))
    }

    #[inline]
    pub(crate) fn quote_prefix(&self) -> &str {
        &self.quote_prefix
    }

    #[inline]
    pub(crate) fn expandable_open(&self) -> &str {
        &self.expandable_open
    }

    #[inline]
    pub(crate) fn expandable_close(&self) -> &str {
        &self.expandable_close
    }
}

impl Default for MarkdownV2Dialect {
    fn default() -> Self {
        Self::empty()
            .with_toggle("```", HtmlTag::Pre)
            .with_toggle("`", HtmlTag::Code)
            .with_toggle("~~", HtmlTag::Strike)
            .with_toggle("--", HtmlTag::Underline)
            .with_toggle("__", HtmlTag::Italic)
            .with_toggle("**", HtmlTag::Bold)
            .with_toggle("||", HtmlTag::Spoiler)
    }
}

/// Parse MarkdownV2 markup into plain text and entities.
///
/// # Example
/// ```
/// use entityfmt::markdown_v2::{self, MarkdownV2Dialect};
/// use entityfmt::EntityKind;
///
/// let doc = markdown_v2::parse(">> a\n>> --b--", &MarkdownV2Dialect::default());
/// assert_eq!(doc.text, "a\nb");
/// assert_eq!(doc.entities[0].kind, EntityKind::Blockquote { collapsed: false });
/// assert_eq!(doc.entities[1].kind, EntityKind::Underline);
/// ```
pub fn parse(markup: &str, dialect: &MarkdownV2Dialect) -> FormattedText {
    let mut diag = Diagnostics::new();
    parse_into(markup, dialect, &mut diag)
}

pub(crate) fn parse_into(
    markup: &str,
    dialect: &MarkdownV2Dialect,
    diag: &mut Diagnostics,
) -> FormattedText {
    if markup.is_empty() {
        return FormattedText::plain(markup);
    }
    let quoted = quote::lower_quotes(markup, dialect, diag);
    let lowered = toggle::lower_toggles(&quoted, dialect);
    tracing::trace!(%lowered, "markdown_v2 lowered to html");
    html::parse_into(&lowered, html::default_dialect(), diag)
}
