//! Errors and recoverable warnings.

/// Fatal codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An entity passed to `unparse` reaches past the end of the text.
    #[error("entity at offset {offset} with length {length} exceeds text of {text_len} UTF-16 units")]
    InvalidEntity {
        offset: u32,
        length: u32,
        text_len: usize,
    },

    /// A dialect name that does not match any known dialect.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Malformed markup that was recovered from.
///
/// Parsing never fails on these; the output is best-effort and each
/// warning is also logged through `tracing`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    /// A closing tag with no matching open tag. Position is 1-based.
    #[error("unmatched closing tag </{tag}> at line {line}:{column}")]
    UnmatchedClosingTag {
        tag: String,
        line: usize,
        column: usize,
    },

    /// Tags still open at end of input; their entities were dropped.
    #[error("unclosed tag <{tag}> (x{count})")]
    UnclosedTag { tag: String, count: usize },

    /// A delimiter with no closing counterpart, kept as literal text.
    /// `offset` is in UTF-16 units of the text at the time of the scan.
    #[error("unmatched delimiter {delimiter:?} at offset {offset}")]
    UnmatchedDelimiter { delimiter: String, offset: usize },

    /// A custom emoji whose document id is not an integer.
    #[error("invalid custom emoji id {0:?}")]
    InvalidEmojiId(String),

    /// An expandable quote block opened on `line` (1-based) and never closed.
    #[error("expandable quote opened at line {line} is never closed")]
    UnterminatedQuote { line: usize },

    /// Open tag ignored because too many entities were already open.
    #[error("too many open tags, ignoring <{tag}>")]
    TooManyOpenTags { tag: String },
}

/// Collects warnings for one parse call and logs each as it arrives.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "recovered from malformed markup");
        self.warnings.push(warning);
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
