//! Quote pass: line shorthands to `<blockquote>` elements.

use crate::error::{Diagnostics, Warning};
use crate::escape;

use super::MarkdownV2Dialect;

enum Line<'a> {
    /// Untouched input.
    Raw(&'a str),
    /// Already lowered to HTML.
    Done(String),
    /// Merged into an earlier line.
    Removed,
}

/// Lines gathered for one quote: (line index, content).
type Block = Vec<(usize, String)>;

/// Collapse quote shorthands into `<blockquote>` lines. In strict mode every
/// remaining line is escaped as well.
pub(crate) fn lower_quotes(text: &str, dialect: &MarkdownV2Dialect, diag: &mut Diagnostics) -> String {
    let strict = dialect.is_strict();
    let mut lines: Vec<Line<'_>> = text
        .split('\n')
        .map(|line| Line::Raw(line.strip_suffix('\r').unwrap_or(line)))
        .collect();

    let content = |line: &str| -> String {
        if strict {
            escape::escape_text(line).into_owned()
        } else {
            line.to_owned()
        }
    };

    expandable_pass(&mut lines, dialect, diag, &content);
    prefix_pass(&mut lines, dialect, &content);

    let mut out = String::with_capacity(text.len() + 32);
    let mut first = true;
    for line in &lines {
        let line = match line {
            Line::Raw(raw) if strict => escape::escape_text(raw),
            Line::Raw(raw) => (*raw).into(),
            Line::Done(done) => done.as_str().into(),
            Line::Removed => continue,
        };
        if !first {
            out.push('\n');
        }
        out.push_str(&line);
        first = false;
    }
    out
}

/// `^^ first` ... `last!^^` blocks.
fn expandable_pass(
    lines: &mut [Line<'_>],
    dialect: &MarkdownV2Dialect,
    diag: &mut Diagnostics,
    content: &impl Fn(&str) -> String,
) {
    let open = dialect.expandable_open();
    let close = dialect.expandable_close();
    if open.is_empty() || close.is_empty() {
        return;
    }

    let mut block = Block::new();
    let mut opened_at = None;

    for index in 0..lines.len() {
        let Line::Raw(line) = lines[index] else {
            continue;
        };

        let body = if opened_at.is_some() {
            strip_marker(line, dialect.quote_prefix()).unwrap_or(line)
        } else {
            let Some(rest) = strip_marker(line, open) else {
                continue;
            };
            opened_at = Some(index);
            rest
        };

        match body.strip_suffix(close) {
            Some(last) => {
                block.push((index, content(last)));
                opened_at = None;
                merge(lines, &mut block, true);
            }
            None => block.push((index, content(body))),
        }
    }

    if let Some(index) = opened_at {
        diag.warn(Warning::UnterminatedQuote { line: index + 1 });
    }
}

/// Runs of `>>` lines.
fn prefix_pass(lines: &mut [Line<'_>], dialect: &MarkdownV2Dialect, content: &impl Fn(&str) -> String) {
    let prefix = dialect.quote_prefix();
    if prefix.is_empty() {
        return;
    }

    let mut block = Block::new();
    for index in 0..lines.len() {
        match lines[index] {
            Line::Removed => continue,
            Line::Raw(line) => match strip_marker(line, prefix) {
                Some(rest) => block.push((index, content(rest))),
                None => merge(lines, &mut block, false),
            },
            Line::Done(_) => merge(lines, &mut block, false),
        }
    }
    merge(lines, &mut block, false);
}

/// Strip `marker` plus one optional space.
#[inline]
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Replace the block's first line with the joined quote and remove the rest.
fn merge(lines: &mut [Line<'_>], block: &mut Block, expandable: bool) {
    let Some(&(first, _)) = block.first() else {
        return;
    };

    let mut html = String::from(if expandable {
        "<blockquote expandable>"
    } else {
        "<blockquote>"
    });
    for (i, (index, text)) in block.iter().enumerate() {
        if i > 0 {
            html.push('\n');
            lines[*index] = Line::Removed;
        }
        html.push_str(text);
    }
    html.push_str("</blockquote>");
    lines[first] = Line::Done(html);
    block.clear();
}
