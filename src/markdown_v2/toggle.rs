//! Toggle pass: delimiters and link syntax to HTML tags.
//!
//! Each toggle token opens a tag the first time it is seen and closes it
//! the next time. Inside `code` and `pre` only the token that opened the
//! region is recognized.

use smallvec::SmallVec;

use crate::cursor::Cursor;
use crate::html::tag;
use crate::html::{HtmlTag, HtmlWriter};

use super::{EMOJI_URL_PREFIX, MarkdownV2Dialect};

/// A link whose label is being scanned; closed when the cursor reaches
/// `label_end`, after which the `](url)` part is skipped.
///
/// Spans opened inside the label are closed with it, and toggles opened
/// before it stay literal inside it, so the link never partially overlaps
/// another span.
struct OpenLink {
    label_end: usize,
    resume: usize,
    tag: HtmlTag,
    /// Toggles already active when the label started.
    outer_toggles: usize,
}

impl OpenLink {
    /// Whether a construct ending at `end` stays inside the label.
    #[inline]
    fn holds(&self, end: usize) -> bool {
        end <= self.label_end
    }
}

/// A fixed-width region: the token that closes it and its tag.
struct Fixed<'d> {
    token: &'d str,
    tag: HtmlTag,
}

pub(crate) fn lower_toggles(text: &str, dialect: &MarkdownV2Dialect) -> String {
    let mut out = HtmlWriter::with_capacity_for(text.len());
    let mut cursor = Cursor::new(text);
    let mut run_start = 0;

    let mut active: SmallVec<[HtmlTag; 8]> = SmallVec::new();
    let mut fixed: Option<Fixed<'_>> = None;
    let mut link: Option<OpenLink> = None;

    while !cursor.is_eof() {
        let pos = cursor.offset();

        if let Some(open) = &link {
            if pos == open.label_end {
                out.write_raw(&text[run_start..pos]);
                if let Some(region) = fixed.take() {
                    out.close_tag(region.tag.canonical_name());
                }
                while active.len() > open.outer_toggles {
                    if let Some(tag) = active.pop() {
                        out.close_tag(tag.canonical_name());
                    }
                }
                out.close_tag(open.tag.canonical_name());
                cursor.set_offset(open.resume);
                run_start = open.resume;
                link = None;
                continue;
            }
        }

        if let Some(region) = &fixed {
            if region.tag == HtmlTag::Pre && cursor.at(b'\n') && text[pos + 1..].starts_with(region.token) {
                // The line break before a closing fence is not content.
                out.write_raw(&text[run_start..pos]);
                cursor.bump();
                run_start = cursor.offset();
                continue;
            }
            if cursor.at_str(region.token) {
                out.write_raw(&text[run_start..pos]);
                out.close_tag(region.tag.canonical_name());
                cursor.advance(region.token.len());
                run_start = cursor.offset();
                fixed = None;
                continue;
            }
            cursor.bump_char();
            continue;
        }

        if cursor.at(b'<') {
            // Existing markup passes through whole, so tokens inside
            // attribute values stay literal.
            match tag::scan_markup(cursor.remaining_slice().as_bytes()) {
                Some(markup) if link.as_ref().is_none_or(|l| l.holds(pos + markup.end_offset())) => {
                    cursor.advance(markup.end_offset())
                }
                _ => cursor.bump(),
            }
            continue;
        }

        if let Some((token, tag)) = dialect.toggle_at(cursor.remaining_slice()) {
            let literal = link.as_ref().is_some_and(|l| {
                !l.holds(pos + token.len())
                    || active.iter().position(|t| *t == tag).is_some_and(|i| i < l.outer_toggles)
            });
            if literal {
                cursor.advance(token.len());
                continue;
            }

            out.write_raw(&text[run_start..pos]);
            cursor.advance(token.len());

            match tag {
                HtmlTag::Pre => {
                    open_pre(&mut out, &mut cursor, token, link.is_some());
                    fixed = Some(Fixed { token, tag });
                }
                HtmlTag::Code => {
                    out.open_tag(tag.canonical_name());
                    fixed = Some(Fixed { token, tag });
                }
                _ => match active.iter().position(|t| *t == tag) {
                    Some(i) => {
                        active.remove(i);
                        out.close_tag(tag.canonical_name());
                    }
                    None => {
                        active.push(tag);
                        out.open_tag(tag.canonical_name());
                    }
                },
            }
            run_start = cursor.offset();
            continue;
        }

        if link.is_none() && (cursor.at(b'[') || cursor.at_str("![")) {
            if let Some(found) = match_link(text, pos) {
                out.write_raw(&text[run_start..pos]);
                match found.emoji_id {
                    Some(id) => {
                        out.open_tag_start(HtmlTag::CustomEmoji.canonical_name());
                        out.attr_i64("document_id", id);
                        out.open_tag_end();
                    }
                    None => {
                        out.open_tag_start(HtmlTag::Link.canonical_name());
                        out.attr("href", &text[found.url.0..found.url.1]);
                        out.open_tag_end();
                    }
                }
                link = Some(OpenLink {
                    label_end: found.label.1,
                    resume: found.end,
                    outer_toggles: active.len(),
                    tag: if found.emoji_id.is_some() {
                        HtmlTag::CustomEmoji
                    } else {
                        HtmlTag::Link
                    },
                });
                cursor.set_offset(found.label.0);
                run_start = found.label.0;
                continue;
            }
        }

        cursor.bump_char();
    }

    out.write_raw(&text[run_start..]);
    out.into_string()
}

/// Write `<pre>` or `<pre language="...">`.
///
/// The language is the rest of the fence line unless the fence closes on
/// that same line or sits in a link label; in those cases the region is
/// inline. A captured language line is consumed together with its line
/// break.
fn open_pre(out: &mut HtmlWriter, cursor: &mut Cursor<'_>, fence: &str, in_label: bool) {
    let rest = cursor.remaining_slice();
    let line_end = cursor.find_newline();
    let line = &rest[..line_end.unwrap_or(rest.len())];

    let inline = in_label || memchr::memmem::find(line.as_bytes(), fence.as_bytes()).is_some();
    let name = HtmlTag::Pre.canonical_name();
    match line_end {
        Some(nl) if !inline => {
            let language = line.trim();
            out.open_tag_start(name);
            if !language.is_empty() {
                out.attr("language", language);
            }
            out.open_tag_end();
            cursor.advance(nl + 1);
        }
        _ => out.open_tag(name),
    }
}

/// Byte ranges of a link match.
struct LinkMatch {
    label: (usize, usize),
    url: (usize, usize),
    /// One past the closing `)`.
    end: usize,
    emoji_id: Option<i64>,
}

/// Match `[label](url)` or `![label](tg://emoji?id=N)` at `pos`.
///
/// Label and url are non-empty and confined to one line; the label runs to
/// the first `](`, the url to the first `)`. An emoji link whose url does
/// not carry an integer id does not match, so its `!` stays literal.
fn match_link(text: &str, pos: usize) -> Option<LinkMatch> {
    let bytes = text.as_bytes();
    let emoji = bytes[pos] == b'!';
    let label_start = pos + if emoji { 2 } else { 1 };

    let line_end = memchr::memchr(b'\n', &bytes[label_start..]).map_or(bytes.len(), |i| label_start + i);
    let line = &bytes[label_start..line_end];

    let label_len = memchr::memmem::find(line, b"](")?;
    if label_len == 0 {
        return None;
    }
    let label_end = label_start + label_len;
    let url_start = label_end + 2;
    let url_len = memchr::memchr(b')', &bytes[url_start..line_end])?;
    if url_len == 0 {
        return None;
    }
    let url_end = url_start + url_len;

    let emoji_id = if emoji {
        let id = text[url_start..url_end].strip_prefix(EMOJI_URL_PREFIX)?;
        Some(id.parse::<i64>().ok()?)
    } else {
        None
    };

    Some(LinkMatch {
        label: (label_start, label_end),
        url: (url_start, url_end),
        end: url_end + 1,
        emoji_id,
    })
}
