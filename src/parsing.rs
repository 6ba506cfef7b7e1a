//! Source locations shared by the tokenizer, the parser and the diagnostics.

use std::fmt;
use std::ops::Range;

/// Byte offsets into the assembly source.
pub type Span = Range<usize>;

/// A position in the source as a 1-based line and column pair.
///
/// Columns count characters, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

pub type LineSpan = Range<LineLocation>;

/// Calculates the line and column of the byte `offset` in `source`.
///
/// Offsets past the end of the source are clamped to the end.
pub fn line_location(source: &str, offset: usize) -> LineLocation {
    let offset = std::cmp::min(offset, source.len());

    let mut line = 1;
    let mut column = 1;

    for ch in source[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 0;
        }

        column += 1;
    }

    LineLocation { line, column }
}

/// Returns the byte range of the whole line containing `offset`, excluding the newline.
pub fn line_bounds(source: &str, offset: usize) -> Span {
    let offset = std::cmp::min(offset, source.len());

    let start = source[..offset]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);

    let end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or_else(|| source.len());

    start..end
}

pub trait AsLineSpan {
    fn as_line_span(&self, source: &str) -> LineSpan;
}

impl AsLineSpan for Span {
    fn as_line_span(&self, source: &str) -> LineSpan {
        line_location(source, self.start)..line_location(source, self.end)
    }
}
