//! Byte cursor for scanning markup.
//!
//! Markup tokens (tags, delimiters, attribute syntax) are all ASCII, so
//! the HTML and MarkdownV2 scanners walk UTF-8 bytes and only ever stop on
//! ASCII positions, which are always char boundaries.

/// A cursor for byte-by-byte scanning over a `&str`.
///
/// # Example
/// ```
/// use entityfmt::cursor::Cursor;
///
/// let mut cursor = Cursor::new("Hello, World!");
/// assert_eq!(cursor.peek(), Some(b'H'));
/// cursor.advance(7);
/// assert_eq!(cursor.peek(), Some(b'W'));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Current byte offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Move to an absolute byte offset.
    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.input.len());
        self.pos = offset;
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    #[inline]
    pub fn bump(&mut self) {
        debug_assert!(!self.is_eof());
        self.pos += 1;
    }

    /// Advance past one whole char (1-4 bytes).
    #[inline]
    pub fn bump_char(&mut self) {
        if let Some(ch) = self.input[self.pos..].chars().next() {
            self.pos += ch.len_utf8();
        }
    }

    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Check whether the remaining input starts with `s`.
    #[inline]
    pub fn at_str(&self, s: &str) -> bool {
        self.remaining_slice().starts_with(s)
    }

    #[inline]
    pub fn remaining_slice(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Find the next occurrence of a byte.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.remaining_slice().as_bytes())
    }

    /// Find the next newline.
    #[inline]
    pub fn find_newline(&self) -> Option<usize> {
        self.find(b'\n')
    }
}

/// 1-based line and column of a byte offset, the way a tag parser reports
/// positions.
pub fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let before = &input.as_bytes()[..offset.min(input.len())];
    let line = memchr::memchr_iter(b'\n', before).count() + 1;
    let line_start = memchr::memrchr(b'\n', before).map_or(0, |p| p + 1);
    let column = input[line_start..offset.min(input.len())].chars().count() + 1;
    (line, column)
}
