//! Trivia extraction: whitespace and comments between tokens.
//!
//! The scanner is total over any string. An unterminated comment simply
//! extends to the end of the scanned range.
//!
//! Offsets are byte offsets into the scanned text. Comment markers and line
//! breaks are ASCII, so every span boundary falls on a `char` boundary as
//! long as the `start`/`end` passed in do.
//!
//! # Example
//!
//! ```ignore
//! use transkit_core::trivia::{scan, TriviaKind};
//!
//! let spans = scan("  // hi\n  foo", 0, None);
//! assert_eq!(spans[1].kind, TriviaKind::LineComment);
//! ```

use core::ops::Range;

/// Classification of a [`TriviaSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    /// Ordinary text: whitespace, or arbitrary characters in a bounded scan.
    Text,
    /// `// ...` up to (not including) the line break, which the comment owns.
    LineComment,
    /// `/* ... */` including both markers.
    BlockComment,
}

/// A classified range of source text produced by [`scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriviaSpan {
    pub kind: TriviaKind,
    pub start: usize,
    pub end: usize,
    /// For comments: a line break immediately follows the comment.
    ///
    /// Line comments set this when they are terminated by a line break
    /// rather than by the end of the range.
    pub has_trailing_blank_line: bool,
}

impl TriviaSpan {
    #[inline]
    pub const fn is_comment(&self) -> bool {
        !matches!(self.kind, TriviaKind::Text)
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The spanned slice of `source`, or `""` when the span is out of range.
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

/// Scans `text` from `start`, classifying trivia spans left to right.
///
/// Without `end`, scanning stops at the first character that is neither
/// whitespace nor part of a comment (leading trivia of a node). With `end`,
/// the whole range `start..end` is classified and non-trivia characters are
/// reported as [`TriviaKind::Text`].
pub fn scan(text: &str, start: usize, end: Option<usize>) -> Vec<TriviaSpan> {
    let bytes = text.as_bytes();
    let bounded = end.is_some();
    let limit = end.map_or(bytes.len(), |end| end.min(bytes.len()));
    let mut pos = start.min(limit);
    let mut text_start = pos;
    let mut spans = Vec::new();

    let flush = |spans: &mut Vec<TriviaSpan>, from: usize, to: usize| {
        if to > from {
            spans.push(TriviaSpan {
                kind: TriviaKind::Text,
                start: from,
                end: to,
                has_trailing_blank_line: false,
            });
        }
    };

    while pos < limit {
        let next = bytes.get(pos + 1).copied().filter(|_| pos + 1 < limit);
        match (bytes[pos], next) {
            (b'/', Some(b'/')) => {
                flush(&mut spans, text_start, pos);
                let eol = find_line_break(bytes, pos + 2, limit);
                spans.push(TriviaSpan {
                    kind: TriviaKind::LineComment,
                    start: pos,
                    end: eol,
                    has_trailing_blank_line: eol < limit,
                });
                pos = skip_line_break(bytes, eol, limit);
                text_start = pos;
            }
            (b'/', Some(b'*')) => {
                flush(&mut spans, text_start, pos);
                let close = find_block_end(bytes, pos + 2, limit);
                spans.push(TriviaSpan {
                    kind: TriviaKind::BlockComment,
                    start: pos,
                    end: close,
                    has_trailing_blank_line: close < limit
                        && matches!(bytes[close], b'\n' | b'\r'),
                });
                pos = close;
                text_start = pos;
            }
            (b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c, _) => pos += 1,
            _ if bounded => pos += 1,
            _ => break,
        }
    }

    flush(&mut spans, text_start, pos);
    spans
}

fn find_line_break(bytes: &[u8], from: usize, limit: usize) -> usize {
    (from..limit)
        .find(|&i| matches!(bytes[i], b'\n' | b'\r'))
        .unwrap_or(limit)
}

/// Position after the line break at `at` (`\r\n` counts as one).
fn skip_line_break(bytes: &[u8], at: usize, limit: usize) -> usize {
    if at >= limit {
        return limit;
    }
    if bytes[at] == b'\r' && at + 1 < limit && bytes[at + 1] == b'\n' {
        at + 2
    } else {
        at + 1
    }
}

fn find_block_end(bytes: &[u8], from: usize, limit: usize) -> usize {
    let mut i = from;
    while i + 1 < limit {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    limit
}

/// First offset at or after `start` that is neither whitespace nor part of
/// a comment.
pub fn skip_trivia(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    match scan(text, start, None).last() {
        Some(span) if span.kind == TriviaKind::LineComment && span.has_trailing_blank_line => {
            skip_line_break(bytes, span.end, bytes.len())
        }
        Some(span) => span.end,
        None => start.min(bytes.len()),
    }
}

/// Counts line breaks outside comments in `text`.
///
/// Each block comment followed by a line break discounts one newline: the
/// comment's own line already ends there. Line comments own their line
/// break, so it is never counted.
pub fn count_naked_newlines(text: &str) -> usize {
    let spans = scan(text, 0, Some(text.len()));
    let mut naked = 0usize;
    let mut trailing = 0usize;
    for span in &spans {
        match span.kind {
            TriviaKind::Text => naked += count_newlines(span.text(text)),
            TriviaKind::BlockComment if span.has_trailing_blank_line => trailing += 1,
            _ => {}
        }
    }
    naked.saturating_sub(trailing)
}

/// Offset just past the first line break in `start..end` that lies outside a
/// block comment, or `end` if the range has none.
///
/// Used to find where the text separating two siblings begins: after the
/// line break that ends the first sibling's line.
pub fn next_line_start(text: &str, start: usize, end: usize) -> usize {
    let bytes = text.as_bytes();
    let end = end.min(bytes.len());
    for span in scan(text, start, Some(end)) {
        match span.kind {
            TriviaKind::Text => {
                if let Some(i) = span.text(text).find('\n') {
                    return span.start + i + 1;
                }
            }
            TriviaKind::LineComment if span.has_trailing_blank_line => {
                return skip_line_break(bytes, span.end, end);
            }
            _ => {}
        }
    }
    end
}

#[inline]
pub fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

#[inline]
pub fn contains_newline(text: &str) -> bool {
    text.contains('\n')
}

/// A string of as many `\n` as `text` contains.
pub fn repeat_newlines(text: &str) -> String {
    "\n".repeat(count_newlines(text))
}

/// Strips comment markers, returning the comment body lines.
///
/// Line comments lose `//` and one following space. Block comments lose the
/// opening `/*` (any run of `*`), the closing `*/` and a leading ` * ` gutter
/// on continuation lines. Trailing whitespace is trimmed from every line.
pub fn strip_comment_markers(comment: &str, block: bool) -> String {
    if !block {
        let body = comment.strip_prefix("//").unwrap_or(comment);
        let body = body.strip_prefix(' ').unwrap_or(body);
        return body.trim_end().to_string();
    }

    let lines: Vec<&str> = comment
        .lines()
        .map(|line| {
            let trimmed = line.trim_end();
            let line = trimmed.strip_suffix("*/").unwrap_or(trimmed);
            if let Some(rest) = line.strip_prefix('/') {
                let inner = rest.trim_start_matches('*');
                if inner.len() < rest.len() {
                    return inner.strip_prefix(' ').unwrap_or(inner).trim_end();
                }
            }
            let gutter = line.trim_start();
            let line = match gutter.strip_prefix('*') {
                Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                None => line,
            };
            line.trim_end()
        })
        .collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}
