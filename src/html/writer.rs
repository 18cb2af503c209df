//! HTML output writer.
//!
//! Shared by the HTML renderer and the MarkdownV2 lowering pass.

use crate::escape;

/// HTML output writer over a pre-allocated buffer.
///
/// Only `&str` input is accepted and escaping only replaces ASCII bytes,
/// so the buffer is always valid UTF-8.
///
/// # Example
/// ```
/// use entityfmt::html::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(32);
/// writer.open_tag("b");
/// writer.write_escaped_text("a < b");
/// writer.close_tag("b");
/// assert_eq!(writer.into_string(), "<b>a &lt; b</b>");
/// ```
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    /// Create with capacity based on the expected text size.
    ///
    /// Tags add roughly a quarter on top of typical message text.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(input_len + input_len / 4),
        }
    }

    /// Write markup verbatim.
    #[inline]
    pub fn write_raw(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        debug_assert!(b.is_ascii());
        self.out.push(b);
    }

    /// Write text content, escaping `<`, `>` and `&`.
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_text_into(&mut self.out, text.as_bytes());
    }

    /// Write an attribute value, escaping quotes as well.
    #[inline]
    pub fn write_escaped_attr(&mut self, value: &str) {
        escape::escape_attr_into(&mut self.out, value.as_bytes());
    }

    /// Write `<name>`.
    #[inline]
    pub fn open_tag(&mut self, name: &str) {
        self.open_tag_start(name);
        self.open_tag_end();
    }

    /// Write `<name` and leave the tag open for attributes.
    #[inline]
    pub fn open_tag_start(&mut self, name: &str) {
        self.write_byte(b'<');
        self.write_raw(name);
    }

    /// Write ` name="value"` with the value escaped.
    #[inline]
    pub fn attr(&mut self, name: &str, value: &str) {
        self.write_byte(b' ');
        self.write_raw(name);
        self.write_raw("=\"");
        self.write_escaped_attr(value);
        self.write_byte(b'"');
    }

    /// Write ` name="<n>"`.
    #[inline]
    pub fn attr_i64(&mut self, name: &str, value: i64) {
        self.write_byte(b' ');
        self.write_raw(name);
        self.write_raw("=\"");
        self.write_i64(value);
        self.write_byte(b'"');
    }

    /// Write a valueless attribute such as ` expandable`.
    #[inline]
    pub fn flag(&mut self, name: &str) {
        self.write_byte(b' ');
        self.write_raw(name);
    }

    #[inline]
    pub fn open_tag_end(&mut self) {
        self.write_byte(b'>');
    }

    /// Write `</name>`.
    #[inline]
    pub fn close_tag(&mut self, name: &str) {
        self.write_raw("</");
        self.write_raw(name);
        self.write_byte(b'>');
    }

    /// Write an i64 as decimal.
    fn write_i64(&mut self, n: i64) {
        if n < 0 {
            self.write_byte(b'-');
        }
        let mut n = n.unsigned_abs();
        if n == 0 {
            self.write_byte(b'0');
            return;
        }

        let mut buf = [0u8; 20];
        let mut i = buf.len();
        while n > 0 {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }
        self.out.extend_from_slice(&buf[i..]);
    }

    #[inline]
    pub fn into_string(self) -> String {
        // SAFETY: only whole `&str` values and ASCII bytes are ever written.
        unsafe { String::from_utf8_unchecked(self.out) }
    }
}
