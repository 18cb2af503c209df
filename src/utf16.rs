//! UTF-16 offset space.
//!
//! Entity offsets and lengths count UTF-16 code units, so every codepoint
//! outside the Basic Multilingual Plane occupies two addressable units.
//! The engines do all of their slicing and length math on `[u16]` buffers
//! produced here and convert back to `String` only at the boundary.

/// Convert host text into the offset address space.
///
/// # Example
/// ```
/// use entityfmt::utf16::to_offset_space;
///
/// assert_eq!(to_offset_space("a😀").len(), 3);
/// ```
#[inline]
pub fn to_offset_space(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Convert a unit buffer back into host text.
///
/// Valid surrogate pairs are recombined. A lone surrogate can only come
/// from a caller-built buffer and is replaced with U+FFFD, since `String`
/// cannot represent it.
#[inline]
pub fn from_offset_space(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Number of UTF-16 code units in `text`, without allocating.
#[inline]
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

#[inline]
pub const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

#[inline]
pub const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}

/// Whether `index` falls strictly between the two units of a surrogate pair.
#[inline]
pub fn within_surrogate(units: &[u16], index: usize) -> bool {
    index > 0
        && index < units.len()
        && is_high_surrogate(units[index - 1])
        && is_low_surrogate(units[index])
}

/// Move `index` forward until it is a legal entity boundary.
#[inline]
pub fn nudge_out_of_surrogate(units: &[u16], mut index: usize) -> usize {
    while within_surrogate(units, index) {
        index += 1;
    }
    index
}

/// Whether a single code unit is whitespace.
///
/// Surrogates are never whitespace; every other unit is a BMP scalar.
#[inline]
pub fn is_whitespace_unit(unit: u16) -> bool {
    char::from_u32(u32::from(unit)).is_some_and(char::is_whitespace)
}

/// Find `needle` in `haystack` starting at `from`.
pub fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Find a single unit in `haystack[from..to]`.
#[inline]
pub fn find_unit(haystack: &[u16], unit: u16, from: usize, to: usize) -> Option<usize> {
    let to = to.min(haystack.len());
    if from >= to {
        return None;
    }
    haystack[from..to]
        .iter()
        .position(|&u| u == unit)
        .map(|pos| pos + from)
}

/// Whether `haystack` has `needle` at `pos`.
#[inline]
pub fn starts_with_at(haystack: &[u16], pos: usize, needle: &[u16]) -> bool {
    haystack
        .get(pos..pos + needle.len())
        .is_some_and(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmp_roundtrip() {
        let units = to_offset_space("héllo");
        assert_eq!(units.len(), 5);
        assert_eq!(from_offset_space(&units), "héllo");
    }

    #[test]
    fn test_astral_takes_two_units() {
        let units = to_offset_space("😀");
        assert_eq!(units, vec![0xD83D, 0xDE00]);
        assert_eq!(utf16_len("😀"), 2);
        assert_eq!(from_offset_space(&units), "😀");
    }

    #[test]
    fn test_within_surrogate() {
        let units = to_offset_space("a😀b");
        assert!(!within_surrogate(&units, 0));
        assert!(!within_surrogate(&units, 1));
        assert!(within_surrogate(&units, 2));
        assert!(!within_surrogate(&units, 3));
        assert!(!within_surrogate(&units, 4));
    }

    #[test]
    fn test_nudge() {
        let units = to_offset_space("😀😀");
        assert_eq!(nudge_out_of_surrogate(&units, 1), 2);
        assert_eq!(nudge_out_of_surrogate(&units, 3), 4);
        assert_eq!(nudge_out_of_surrogate(&units, 2), 2);
    }

    #[test]
    fn test_lone_surrogate_is_replaced() {
        assert_eq!(from_offset_space(&[0x61, 0xD83D]), "a\u{FFFD}");
    }

    #[test]
    fn test_whitespace_units() {
        assert!(is_whitespace_unit(b' ' as u16));
        assert!(is_whitespace_unit(b'\n' as u16));
        assert!(is_whitespace_unit(0x00A0));
        assert!(!is_whitespace_unit(0xD83D));
        assert!(!is_whitespace_unit(b'x' as u16));
    }

    #[test]
    fn test_find_units() {
        let hay = to_offset_space("a**b**");
        let needle = to_offset_space("**");
        assert_eq!(find_units(&hay, &needle, 0), Some(1));
        assert_eq!(find_units(&hay, &needle, 2), Some(4));
        assert_eq!(find_units(&hay, &needle, 5), None);
        assert_eq!(find_units(&hay, &needle, 10), None);
    }

    #[test]
    fn test_find_unit_bounds() {
        let hay = to_offset_space("ab\ncd");
        assert_eq!(find_unit(&hay, b'\n' as u16, 0, 5), Some(2));
        assert_eq!(find_unit(&hay, b'\n' as u16, 0, 2), None);
        assert_eq!(find_unit(&hay, b'\n' as u16, 4, 2), None);
    }

    #[test]
    fn test_starts_with_at() {
        let hay = to_offset_space("x```");
        assert!(starts_with_at(&hay, 1, &to_offset_space("```")));
        assert!(!starts_with_at(&hay, 2, &to_offset_space("```")));
    }
}
