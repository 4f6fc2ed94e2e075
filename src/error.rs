use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::location::Range;
use crate::report::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

/// The grammar rule which could not be matched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("expected an entry type after `@`")]
    ExpectedEntryType,
    #[error("expected `{{` or `(` to open the entry body")]
    ExpectedOpeningDelimiter,
    #[error("expected a citation key")]
    ExpectedCitekey,
    #[error("expected `,` or the end of the entry")]
    ExpectedComma,
    #[error("expected the end of the entry")]
    ExpectedClosingDelimiter,
    #[error("expected a field name")]
    ExpectedFieldName,
    #[error("expected `=` after the field name")]
    ExpectedEquals,
    #[error("expected a braced, quoted or bare value")]
    ExpectedValue,
    #[error("braced value has an unbalanced `{{`")]
    UnbalancedBraces,
    #[error("quoted value is never closed")]
    UnterminatedQuote,
    #[error("quoted value has an unmatched `}}`")]
    UnexpectedClosingBrace,
    #[error("entry body is never closed")]
    UnterminatedEntry,
}

/// A syntax error: the first position of the input that no grammar rule could match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFailure {
    /// Location of the failure.
    pub at: Range,
    /// The rule which failed.
    pub kind: SyntaxErrorKind,
    /// The source text at the start of the failure, up to the end of its line.
    pub found: String,
}

impl SyntaxFailure {
    /// A human-readable message naming the failed rule and the offending text.
    pub fn message(&self) -> String {
        if self.found.is_empty() {
            format!("{} but the input ended", self.kind)
        } else {
            format!("{} but found `{}`", self.kind, self.found)
        }
    }
}

impl std::fmt::Display for SyntaxFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "syntax error between {} and {}: {}",
            self.at.start,
            self.at.end,
            self.message()
        )
    }
}

impl std::error::Error for SyntaxFailure {}

/// Errors which end an import.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{failure}")]
    Syntax {
        failure: SyntaxFailure,
        diagnostic: Diagnostic,
    },

    #[error("failed to read bibliography: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// The syntax failure, if this is a syntax error.
    pub fn syntax_failure(&self) -> Option<&SyntaxFailure> {
        match self {
            Error::Syntax { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;

    fn failure(found: &str) -> SyntaxFailure {
        let start = SourceLocation {
            line: 2,
            column: 5,
            offset: 12,
        };
        SyntaxFailure {
            at: Range { start, end: start },
            kind: SyntaxErrorKind::ExpectedEquals,
            found: found.to_owned(),
        }
    }

    #[test]
    fn test_from_config_error() {
        let err: Error = crate::config::ParserConfig::default()
            .with_max_matches(0)
            .validate()
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Config(ConfigError::ZeroMaxMatches)));
        assert!(err.syntax_failure().is_none());
        assert_eq!(err.to_string(), "max_matches_per_pass must be at least 1");
    }

    #[test]
    fn test_message() {
        assert_eq!(
            failure("}").message(),
            "expected `=` after the field name but found `}`"
        );
        assert_eq!(
            failure("").message(),
            "expected `=` after the field name but the input ended"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            failure("}").to_string(),
            "syntax error between line 2, column 5 and line 2, column 5: \
             expected `=` after the field name but found `}`"
        );
    }
}
