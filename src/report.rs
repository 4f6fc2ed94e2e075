//! Human-readable reports of syntax errors.
//!
//! The report shows a window of numbered source lines around the failure, with a `↓` marker
//! above the column where the failure starts and a `↑` marker below the column where it ends:
//! ```text
//! The offending lines in the BibTeX file are shown below:
//!
//! 1 | @article{k1,
//!            ↓ (Start of error)
//! 2 |   title = ,
//!            ↑ (End of error)
//! 3 | }
//! ```
use std::fmt;

use crate::error::SyntaxFailure;
use crate::location::Range;

/// Number of lines shown before the line where the failure starts.
pub const LINES_BEFORE: usize = 4;

/// Number of lines shown after the line where the failure ends.
pub const LINES_AFTER: usize = 3;

const HEADER: &str = "The offending lines in the BibTeX file are shown below:\n\n";

/// A rendered syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// One line describing the failure and its location.
    pub headline: String,
    /// The source window, as produced by [`render`].
    pub window: String,
}

impl Diagnostic {
    pub fn new(text: &str, failure: &SyntaxFailure) -> Self {
        Self {
            headline: format!(
                "Syntax error in BibTeX between {} and {}: {}",
                failure.at.start,
                failure.at.end,
                failure.message()
            ),
            window: render(text, &failure.at),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline)?;
        write!(f, "{}", self.window)
    }
}

/// Render the lines of `text` around `range`.
///
/// Lines are numbered from 1 and the window is clipped to the lines of the text. A range ending
/// on a later line than it starts shows every line in between.
pub fn render(text: &str, range: &Range) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let count = lines.len();

    let start_line = range.start.line.clamp(1, count);
    let end_line = range.end.line.clamp(start_line, count);
    let first = start_line.saturating_sub(LINES_BEFORE).max(1);
    let last = (end_line + LINES_AFTER).min(count);

    let width = last.to_string().len();
    // `{number} | ` precedes the line text
    let gutter = width + 3;

    let mut out = String::from(HEADER);
    for number in first..=last {
        if number == start_line {
            out.push_str(&marker(gutter + range.start.column - 1, "↓ (Start of error)"));
        }
        out.push_str(&format!("{number:>width$} | {}\n", lines[number - 1]));
        if number == end_line {
            out.push_str(&marker(gutter + range.end.column - 1, "↑ (End of error)"));
        }
    }
    out
}

fn marker(indent: usize, label: &str) -> String {
    format!("{:indent$}{label}\n", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;

    fn at(text: &str, start: usize, end: usize) -> Range {
        Range::locate(text, start, end)
    }

    #[test]
    fn test_window() {
        let text: String = (1..=10).map(|n| format!("line {n}\n")).collect();
        // line 5, column 3
        let offset = 4 * 7 + 2;
        let range = at(&text, offset, offset + 1);
        assert_eq!(
            range.start,
            SourceLocation {
                line: 5,
                column: 3,
                offset
            }
        );

        let window = render(&text, &range);
        let numbered: Vec<&str> = window
            .lines()
            .filter(|line| line.contains(" | "))
            .collect();
        assert_eq!(numbered.len(), 8);
        assert_eq!(numbered[0], "1 | line 1");
        assert_eq!(numbered[7], "8 | line 8");

        assert_eq!(
            window,
            "The offending lines in the BibTeX file are shown below:\n\n\
             1 | line 1\n\
             2 | line 2\n\
             3 | line 3\n\
             4 | line 4\n      \
             ↓ (Start of error)\n\
             5 | line 5\n       \
             ↑ (End of error)\n\
             6 | line 6\n\
             7 | line 7\n\
             8 | line 8\n"
        );
    }

    #[test]
    fn test_clipped_at_end() {
        let text = "@article{k,\n  title = {open\n";
        let range = at(text, 20, text.len());
        let window = render(text, &range);
        assert!(window.contains("1 | @article{k,\n"));
        assert!(window.contains("2 |   title = {open\n"));
        assert!(window.ends_with("3 | \n    ↑ (End of error)\n"));
    }

    #[test]
    fn test_gutter_width() {
        let text: String = (1..=12).map(|n| format!("{n}\n")).collect();
        let offset = text.find("9\n").unwrap();
        let window = render(&text, &at(&text, offset, offset));
        assert!(window.contains(" 5 | 5\n"));
        assert!(window.contains("12 | 12\n"));
        assert!(window.contains("\n     ↓ (Start of error)\n 9 | 9\n"));
    }

    #[test]
    fn test_diagnostic() {
        use crate::error::{SyntaxErrorKind, SyntaxFailure};

        let text = "@article{k, a b}";
        let failure = SyntaxFailure {
            at: at(text, 14, 15),
            kind: SyntaxErrorKind::ExpectedEquals,
            found: "b}".into(),
        };
        let diagnostic = Diagnostic::new(text, &failure);
        assert_eq!(
            diagnostic.headline,
            "Syntax error in BibTeX between line 1, column 15 and line 1, column 16: \
             expected `=` after the field name but found `b}`"
        );
        assert!(diagnostic.to_string().starts_with(&diagnostic.headline));
        assert!(diagnostic.window.contains("1 | @article{k, a b}\n"));
    }
}
