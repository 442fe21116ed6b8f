//! Error types and result aliases for pep8check.
//!
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used by the driver and pipeline
//! - [`TokenizeError`]: raised by the tokenizer on malformed source
//! - [`CheckError`]: per-file failure surfaced to the caller

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

use crate::parser::Position;

pub type Result<T> = AnyhowResult<T>;

/// What went wrong while tokenizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeErrorKind {
    UnterminatedString,
    UnterminatedTripleQuotedString,
    EofInStatement,
    UnmatchedClosingBracket,
    InconsistentDedent,
}

impl std::fmt::Display for TokenizeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UnterminatedString => "EOL while scanning string literal",
            Self::UnterminatedTripleQuotedString => "EOF in multi-line string",
            Self::EofInStatement => "EOF in multi-line statement",
            Self::UnmatchedClosingBracket => "unmatched closing bracket",
            Self::InconsistentDedent => "unindent does not match any outer indentation level",
        };
        f.write_str(text)
    }
}

/// The source text could not be split into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {}:{}", .position.row, .position.col + 1)]
pub struct TokenizeError {
    pub kind: TokenizeErrorKind,
    pub position: Position,
}

impl TokenizeError {
    #[must_use]
    pub fn new(kind: TokenizeErrorKind, row: usize, col: usize) -> Self {
        Self {
            kind,
            position: Position::new(row, col),
        }
    }
}

/// Fatal failure for a single file. Other files keep being processed.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{}:{}:{}: syntax error: {}", .path.display(), .source.position.row, .source.position.col + 1, .source.kind)]
    Syntax {
        path: PathBuf,
        #[source]
        source: TokenizeError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    /// Syntax failures are reported but are not I/O problems.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_error_display() {
        let err = TokenizeError::new(TokenizeErrorKind::EofInStatement, 3, 0);
        assert_eq!(err.to_string(), "EOF in multi-line statement at 3:1");
    }

    #[test]
    fn test_syntax_error_display_includes_path() {
        let err = CheckError::Syntax {
            path: PathBuf::from("spam.py"),
            source: TokenizeError::new(TokenizeErrorKind::UnmatchedClosingBracket, 2, 4),
        };
        assert_eq!(
            err.to_string(),
            "spam.py:2:5: syntax error: unmatched closing bracket"
        );
        assert!(err.is_syntax());
    }
}
