//! Token types produced by the tokenizer

use std::fmt;
use std::sync::Arc;

/// Source position: 1-based row, 0-based byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    Number,
    Op,
    String,
    Comment,
    /// Line break that does not end a statement (blank lines, comment lines, inside brackets)
    Nl,
    /// End of a statement
    Newline,
    Indent,
    Dedent,
    EndMarker,
    /// Character the tokenizer does not recognize
    ErrorToken,
}

impl TokenKind {
    /// Layout tokens carry no statement content.
    #[must_use]
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            Self::Nl | Self::Newline | Self::Indent | Self::Dedent | Self::EndMarker
        )
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Number => "NUMBER",
            Self::Op => "OP",
            Self::String => "STRING",
            Self::Comment => "COMMENT",
            Self::Nl => "NL",
            Self::Newline => "NEWLINE",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::EndMarker => "ENDMARKER",
            Self::ErrorToken => "ERRORTOKEN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    pub end: Position,
    /// Physical line the token starts on
    pub line: Arc<str>,
}

impl Token {
    #[must_use]
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        start: Position,
        end: Position,
        line: Arc<str>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
            line,
        }
    }

    /// True for an operator token with exactly this text.
    #[must_use]
    pub fn is_op(&self, text: &str) -> bool {
        self.kind == TokenKind::Op && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = if self.start.row == self.end.row {
            format!("[{}:{}]", self.start.col, self.end.col)
        } else {
            format!("l.{}", self.end.row)
        };
        write!(
            f,
            "l.{}\t{}\t{}\t{:?}",
            self.start.row,
            pos,
            self.kind.name(),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_kinds() {
        assert!(TokenKind::Nl.is_layout());
        assert!(TokenKind::Dedent.is_layout());
        assert!(!TokenKind::Comment.is_layout());
        assert!(!TokenKind::ErrorToken.is_layout());
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 0));
        assert!(Position::new(2, 1) > Position::new(2, 0));
    }

    #[test]
    fn test_token_display() {
        let line: Arc<str> = Arc::from("x = 1\n");
        let tok = Token::new(
            TokenKind::Op,
            "=",
            Position::new(1, 2),
            Position::new(1, 3),
            line,
        );
        assert_eq!(tok.to_string(), "l.1\t[2:3]\tOP\t\"=\"");
        assert!(tok.is_op("="));
        assert!(!tok.is_op("=="));
    }
}
