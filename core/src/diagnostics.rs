//! Diagnostics collected during a translation run.
//!
//! Diagnostics are append-only and never abort translation. Each one names
//! the offending node by kind and source range; [`LineIndex`] turns those
//! byte offsets into line/column positions for display.

use core::fmt;
use std::borrow::Cow;

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// A message about one source node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Kind name of the node the message is about.
    pub kind: Cow<'static, str>,
    /// Byte offset of the node's first token.
    pub start: usize,
    /// Byte offset just past the node's last token.
    pub end: usize,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    /// Formats the diagnostic with a `line:column` position.
    pub fn display_with<'a>(&'a self, lines: &'a LineIndex) -> impl fmt::Display + 'a {
        DisplayWith {
            diagnostic: self,
            lines,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} at {}..{})",
            self.severity, self.message, self.kind, self.start, self.end
        )
    }
}

struct DisplayWith<'a> {
    diagnostic: &'a Diagnostic,
    lines: &'a LineIndex,
}

impl fmt::Display for DisplayWith<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.lines.line_col(self.diagnostic.start);
        write!(
            f,
            "{}:{}: {}: {}",
            line, column, self.diagnostic.severity, self.diagnostic.message
        )
    }
}

/// Ordered, append-only collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Maps byte offsets to 1-based line and column numbers.
///
/// Columns count bytes.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let start = self.line_starts.get(line).copied().unwrap_or_default();
        (line + 1, offset.saturating_sub(start) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostic(start: usize, severity: Severity) -> Diagnostic {
        Diagnostic {
            kind: "WhileStatement".into(),
            start,
            end: start + 5,
            message: "unsupported".to_string(),
            severity,
        }
    }

    #[test_case::test_case(0, (1, 1); "start")]
    #[test_case::test_case(3, (1, 4); "newline itself")]
    #[test_case::test_case(4, (2, 1); "second line")]
    #[test_case::test_case(10, (3, 2); "third line")]
    #[test_case::test_case(100, (3, 92); "past end")]
    fn test_line_col(offset: usize, expected: (usize, usize)) {
        let lines = LineIndex::new("abc\ndefg\nhi");
        assert_eq!(lines.line_col(offset), expected);
    }

    #[test]
    fn test_display() {
        let lines = LineIndex::new("a;\nwhile (x) {}");
        let d = diagnostic(3, Severity::Error);
        insta::assert_snapshot!(d.to_string(), @"error: unsupported (WhileStatement at 3..8)");
        insta::assert_snapshot!(d.display_with(&lines).to_string(), @"2:1: error: unsupported");
    }

    #[test]
    fn test_has_errors() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(diagnostic(0, Severity::Warning));
        assert!(!diagnostics.has_errors());
        diagnostics.push(diagnostic(0, Severity::Error));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.into_vec()[1].severity, Severity::Error);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
