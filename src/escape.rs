//! HTML escaping utilities.
//!
//! Fast-path optimized: scans for first escapable character,
//! then bulk-copies segments between escapes.

use std::borrow::Cow;

use memchr::{memchr2, memchr3};

/// Lookup table for escapable characters in text content.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table
};

/// Lookup table for escapable characters in attributes.
const ATTR_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table[b'\'' as usize] = true;
    table
};

/// Escape text content into output buffer.
///
/// Escapes `<`, `>`, and `&`. Quotes are left alone: text content is never
/// inside an attribute.
///
/// # Example
/// ```
/// use entityfmt::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"<script>");
/// assert_eq!(out, b"&lt;script&gt;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    match memchr3(b'<', b'>', b'&', input) {
        Some(pos) => escape_into_with_table(out, input, pos, &TEXT_ESCAPE_TABLE),
        None => out.extend_from_slice(input),
    }
}

/// Escape an attribute value into output buffer.
///
/// Escapes `<`, `>`, `&`, `"`, and `'`.
///
/// # Example
/// ```
/// use entityfmt::escape::escape_attr_into;
///
/// let mut out = Vec::new();
/// escape_attr_into(&mut out, b"a\"b");
/// assert_eq!(out, b"a&quot;b");
/// ```
#[inline]
pub fn escape_attr_into(out: &mut Vec<u8>, input: &[u8]) {
    match first_attr_escape(input) {
        Some(pos) => escape_into_with_table(out, input, pos, &ATTR_ESCAPE_TABLE),
        None => out.extend_from_slice(input),
    }
}

/// Internal escaping with a custom lookup table, starting from the first
/// position known to need escaping.
#[inline]
fn escape_into_with_table(out: &mut Vec<u8>, input: &[u8], first: usize, escape_table: &[bool; 256]) {
    out.reserve(input.len() + 8);
    out.extend_from_slice(&input[..first]);

    let mut pos = first;
    while pos < input.len() {
        let scan_start = pos;
        while pos < input.len() && !escape_table[input[pos] as usize] {
            pos += 1;
        }

        if pos > scan_start {
            out.extend_from_slice(&input[scan_start..pos]);
        }

        if pos < input.len() {
            let escape_seq: &[u8] = match input[pos] {
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                b'&' => b"&amp;",
                b'"' => b"&quot;",
                b'\'' => b"&#x27;",
                other => {
                    out.push(other);
                    pos += 1;
                    continue;
                }
            };
            out.extend_from_slice(escape_seq);
            pos += 1;
        }
    }
}

#[inline]
fn first_attr_escape(input: &[u8]) -> Option<usize> {
    let a = memchr3(b'<', b'>', b'&', input);
    let b = memchr2(b'"', b'\'', input);
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Check if text needs any escaping.
#[inline]
pub fn needs_text_escape(input: &[u8]) -> bool {
    memchr3(b'<', b'>', b'&', input).is_some()
}

/// Escape text content and return it as a `String`.
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if !needs_text_escape(input.as_bytes()) {
        return Cow::Borrowed(input);
    }
    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    escape_text_into(&mut out, input.as_bytes());
    // Only ASCII sequences were added to valid UTF-8.
    Cow::Owned(String::from_utf8_lossy(&out).into_owned())
}

/// Decode character references (`&amp;`, `&#x1F600;`, `&lt;`, ...).
///
/// Unknown references are kept verbatim.
#[inline]
pub fn unescape(input: &str) -> Cow<'_, str> {
    if memchr::memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    html_escape::decode_html_entities(input)
}
