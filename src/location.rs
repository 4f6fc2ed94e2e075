//! Source positions in the bibliography text.
use std::fmt;

use memchr::{memchr_iter, memrchr};
use serde::Serialize;

/// A position in the input. Lines and columns are 1-indexed, with columns counted in chars; the
/// offset is a 0-indexed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub const START: Self = Self {
        line: 1,
        column: 1,
        offset: 0,
    };

    /// Compute the location of the byte `offset` in `text`.
    ///
    /// An offset past the end is clamped to the end, and an offset inside a multi-byte char is
    /// moved back to the start of that char.
    pub fn locate(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let head = &text.as_bytes()[..offset];
        let line_start = memrchr(b'\n', head).map_or(0, |idx| idx + 1);

        Self {
            line: 1 + memchr_iter(b'\n', head).count(),
            column: 1 + text[line_start..offset].chars().count(),
            offset,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A half-open span of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Range {
    pub fn locate(text: &str, start: usize, end: usize) -> Self {
        Self {
            start: SourceLocation::locate(text, start),
            end: SourceLocation::locate(text, end.max(start)),
        }
    }

    /// An empty range at `offset`.
    pub fn point(text: &str, offset: usize) -> Self {
        let loc = SourceLocation::locate(text, offset);
        Self {
            start: loc,
            end: loc,
        }
    }

    /// Translate a range computed on `text[base..]` into a range on the whole of `text`.
    pub fn rebase(&self, text: &str, base: usize) -> Self {
        Self::locate(text, base + self.start.offset, base + self.end.offset)
    }
}
