//! DoS prevention constants.
//!
//! These limits keep pathological markup from turning the per-call work
//! quadratic.

/// Maximum number of simultaneously open HTML entities. Every text run
/// extends each open entity, so this bounds the work per run.
pub const MAX_OPEN_TAGS: usize = 256;

/// Maximum attributes scanned per HTML tag; the rest are skipped.
pub const MAX_TAG_ATTRIBUTES: usize = 16;

/// Maximum length of a tag or attribute name; longer names are not tags.
pub const MAX_TAG_NAME_LEN: usize = 64;

/// Maximum length of a fenced-block language tag. Longer first lines are
/// treated as content.
pub const MAX_LANGUAGE_LEN: usize = 256;
