//! entityfmt: message-formatting entity codec.
//!
//! Converts between plain text plus formatting entities (offsets in UTF-16
//! code units) and three markup dialects:
//!
//! - [`Dialect::Markdown`]: `**bold**`, `__italic__`, `[label](url)`, ...
//! - [`Dialect::Html`]: `<b>`, `<a href="...">`, `<pre language="...">`, ...
//! - [`Dialect::MarkdownV2`]: toggle delimiters, `>>` quotes and
//!   `^^ ... !^^` expandable quotes, lowered onto the HTML dialect.
//!
//! # Design Principles
//! - Single pass: every engine scans its input once, left to right
//! - No regex: byte- and unit-level scanning only
//! - Never fails on markup: malformed input is repaired and reported as
//!   [`Warning`]s
//! - Immutable tables: dialect vocabularies are plain values, built once
//!
//! # Example
//! ```
//! use entityfmt::{Dialect, EntityKind, TextEntity};
//!
//! let doc = entityfmt::parse("**hi** 😀 __there__", Dialect::Markdown);
//! assert_eq!(doc.text, "hi 😀 there");
//! assert_eq!(doc.entities[1], TextEntity::new(6, 5, EntityKind::Italic));
//!
//! let html = entityfmt::unparse(&doc.text, &doc.entities, Dialect::Html).unwrap();
//! assert_eq!(html, "<b>hi</b> 😀 <i>there</i>");
//! ```

pub mod cursor;
pub mod entity;
pub mod error;
pub mod escape;
pub mod html;
pub mod limits;
pub mod markdown;
pub mod markdown_v2;
pub mod utf16;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

pub use entity::{EntityKind, FormattedText, TextEntity};
pub use error::{Error, Result, Warning};
pub use html::{HtmlDialect, HtmlTag};
pub use markdown::MarkdownDialect;
pub use markdown_v2::MarkdownV2Dialect;

use error::Diagnostics;

/// A markup dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Markdown,
    Html,
    MarkdownV2,
}

impl Dialect {
    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::MarkdownV2 => "markdownv2",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "markdownv2" | "markdown2" | "md2" => Ok(Self::MarkdownV2),
            _ => Err(Error::UnknownDialect(s.to_owned())),
        }
    }
}

/// Dialect tables used by the `*_with_options` entry points.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub markdown: MarkdownDialect,
    pub html: HtmlDialect,
    pub markdown_v2: MarkdownV2Dialect,
}

static DEFAULT_OPTIONS: LazyLock<Options> = LazyLock::new(Options::default);

/// The shared default tables.
pub fn default_options() -> &'static Options {
    &DEFAULT_OPTIONS
}

/// Parse markup into plain text and entities using the default tables.
///
/// Empty markup yields empty text and no entities.
pub fn parse(markup: &str, dialect: Dialect) -> FormattedText {
    parse_with_options(markup, dialect, default_options())
}

/// Parse markup with caller-supplied tables.
pub fn parse_with_options(markup: &str, dialect: Dialect, options: &Options) -> FormattedText {
    let mut diag = Diagnostics::new();
    parse_into(markup, dialect, options, &mut diag)
}

/// Parse markup and also return the warnings for every repair made.
///
/// # Example
/// ```
/// use entityfmt::{Dialect, Warning};
///
/// let (doc, warnings) =
///     entityfmt::parse_with_warnings("<b>bold", Dialect::Html, entityfmt::default_options());
/// assert_eq!(doc.text, "bold");
/// assert!(doc.entities.is_empty());
/// assert!(matches!(warnings[0], Warning::UnclosedTag { .. }));
/// ```
pub fn parse_with_warnings(
    markup: &str,
    dialect: Dialect,
    options: &Options,
) -> (FormattedText, Vec<Warning>) {
    let mut diag = Diagnostics::new();
    let doc = parse_into(markup, dialect, options, &mut diag);
    (doc, diag.into_warnings())
}

fn parse_into(markup: &str, dialect: Dialect, options: &Options, diag: &mut Diagnostics) -> FormattedText {
    match dialect {
        Dialect::Markdown => markdown::parse_into(markup, &options.markdown, diag),
        Dialect::Html => html::parse_into(markup, &options.html, diag),
        Dialect::MarkdownV2 => markdown_v2::parse_into(markup, &options.markdown_v2, diag),
    }
}

/// Render text and entities as markup using the default tables.
///
/// Empty text or no entities returns the text unchanged. Fails with
/// [`Error::InvalidEntity`] when an entity reaches past the end of `text`.
pub fn unparse(text: &str, entities: &[TextEntity], dialect: Dialect) -> Result<String> {
    unparse_with_options(text, entities, dialect, default_options())
}

/// Render with caller-supplied tables.
pub fn unparse_with_options(
    text: &str,
    entities: &[TextEntity],
    dialect: Dialect,
    options: &Options,
) -> Result<String> {
    match dialect {
        Dialect::Markdown => markdown::unparse(text, entities, &options.markdown),
        Dialect::Html => html::unparse(text, entities, &options.html),
        Dialect::MarkdownV2 => markdown_v2::unparse(text, entities, &options.markdown_v2),
    }
}
