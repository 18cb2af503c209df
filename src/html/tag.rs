//! HTML tag scanner.
//!
//! Recognizes just enough HTML for message markup: start, end and
//! self-closing tags with attributes, plus comments, declarations and
//! processing instructions (which are skipped). Anything else starting
//! with `<` is left to the caller as literal text.

use smallvec::SmallVec;

use crate::escape;
use crate::limits::{MAX_TAG_ATTRIBUTES, MAX_TAG_NAME_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    Open,
    Close,
    SelfClosing,
}

/// One attribute. Names are lowercased, values are entity-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// A scanned tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagInfo {
    /// Lowercased tag name.
    pub name: String,
    pub kind: TagKind,
    pub attrs: SmallVec<[Attribute; 2]>,
    /// Byte offset after the closing `>`.
    pub end_offset: usize,
}

impl TagInfo {
    /// Value of attribute `name`. The last occurrence wins; a valueless
    /// attribute reads as the empty string.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .rev()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    #[inline]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Markup {
    Tag(TagInfo),
    /// Comment, declaration or processing instruction.
    Ignored { end_offset: usize },
}

impl Markup {
    #[inline]
    pub fn end_offset(&self) -> usize {
        match self {
            Self::Tag(tag) => tag.end_offset,
            Self::Ignored { end_offset } => *end_offset,
        }
    }
}

/// Scan markup at the start of `input`, which must begin with `<`.
///
/// Returns `None` when the `<` does not begin well-formed markup.
pub(crate) fn scan_markup(input: &[u8]) -> Option<Markup> {
    let len = input.len();
    if len < 2 || input[0] != b'<' {
        return None;
    }

    if input.starts_with(b"<!--") {
        let end = memchr::memmem::find(&input[4..], b"-->")?;
        return Some(Markup::Ignored {
            end_offset: 4 + end + 3,
        });
    }
    if input[1] == b'!' || input[1] == b'?' {
        let end = memchr::memchr(b'>', &input[2..])?;
        return Some(Markup::Ignored {
            end_offset: 2 + end + 1,
        });
    }

    scan_tag(input).map(Markup::Tag)
}

fn scan_tag(input: &[u8]) -> Option<TagInfo> {
    let len = input.len();
    let mut pos = 1;

    let is_closing = input[pos] == b'/';
    if is_closing {
        pos += 1;
    }

    let name_start = pos;
    if pos >= len || !input[pos].is_ascii_alphabetic() {
        return None;
    }
    while pos < len && is_name_byte(input[pos]) {
        pos += 1;
    }
    if pos - name_start > MAX_TAG_NAME_LEN {
        return None;
    }
    let name = ascii_lowercase(&input[name_start..pos]);

    if is_closing {
        pos = skip_whitespace(input, pos);
        if pos < len && input[pos] == b'>' {
            return Some(TagInfo {
                name,
                kind: TagKind::Close,
                attrs: SmallVec::new(),
                end_offset: pos + 1,
            });
        }
        return None;
    }

    // A name must be followed by whitespace, `>` or `/`.
    if pos < len && !matches!(input[pos], b'>' | b'/') && !input[pos].is_ascii_whitespace() {
        return None;
    }

    let mut attrs: SmallVec<[Attribute; 2]> = SmallVec::new();
    pos = skip_whitespace(input, pos);
    while pos < len && input[pos] != b'>' && !input[pos..].starts_with(b"/>") {
        if !(input[pos].is_ascii_alphabetic() || input[pos] == b'_' || input[pos] == b':') {
            return None;
        }
        let attr_start = pos;
        while pos < len && is_name_byte(input[pos]) {
            pos += 1;
        }
        if pos - attr_start > MAX_TAG_NAME_LEN {
            return None;
        }
        let attr_name = ascii_lowercase(&input[attr_start..pos]);

        pos = skip_whitespace(input, pos);
        let mut value = None;
        if pos < len && input[pos] == b'=' {
            pos = skip_whitespace(input, pos + 1);
            if pos >= len {
                return None;
            }
            let (raw, next) = match input[pos] {
                quote @ (b'"' | b'\'') => {
                    let end = memchr::memchr(quote, &input[pos + 1..])?;
                    (&input[pos + 1..pos + 1 + end], pos + end + 2)
                }
                _ => {
                    let start = pos;
                    while pos < len && !input[pos].is_ascii_whitespace() && input[pos] != b'>' {
                        pos += 1;
                    }
                    (&input[start..pos], pos)
                }
            };
            pos = next;
            let raw = std::str::from_utf8(raw).ok()?;
            value = Some(escape::unescape(raw).into_owned());
        }

        if attrs.len() < MAX_TAG_ATTRIBUTES {
            attrs.push(Attribute {
                name: attr_name,
                value,
            });
        }
        pos = skip_whitespace(input, pos);
    }

    if pos >= len {
        return None;
    }

    if input[pos] == b'/' {
        return Some(TagInfo {
            name,
            kind: TagKind::SelfClosing,
            attrs,
            end_offset: pos + 2,
        });
    }

    Some(TagInfo {
        name,
        kind: TagKind::Open,
        attrs,
        end_offset: pos + 1,
    })
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.')
}

#[inline]
fn ascii_lowercase(bytes: &[u8]) -> String {
    bytes.iter().map(|b| b.to_ascii_lowercase() as char).collect()
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}
