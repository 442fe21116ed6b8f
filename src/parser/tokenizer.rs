//! Python tokenizer
//!
//! Splits source text into the token stream the checker consumes: names,
//! numbers, operators, strings and comments, plus the layout tokens
//! (`NL`, `NEWLINE`, `INDENT`, `DEDENT`, `ENDMARKER`) that describe how the
//! physical lines group into statements.
//!
//! Rows are 1-based and columns are 0-based byte offsets into the row.

use std::sync::Arc;

use tracing::trace;

use super::patterns::{PSEUDO_TOKEN_RE, STRING_START_RE};
use super::token::{Position, Token, TokenKind};
use crate::error::{TokenizeError, TokenizeErrorKind};

/// Column width of a tab when measuring block indentation
const TOKENIZER_TAB_SIZE: usize = 8;

/// Split source text into physical lines, keeping each line terminator.
#[must_use]
pub fn split_lines(source: &str) -> Vec<&str> {
    source.split_inclusive('\n').collect()
}

/// Tokenize a whole source file.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let lines = split_lines(source);
    let mut tokenizer = Tokenizer::new();
    let mut row = 0;
    for line in lines.iter().copied().chain(std::iter::once("")) {
        row += 1;
        if !tokenizer.feed_line(line, row)? {
            break;
        }
    }
    tokenizer.finish(&lines, row)
}

/// String literal still open at the end of a physical line
struct PendingString {
    start: Position,
    text: String,
    quote: &'static str,
    line: Arc<str>,
}

struct Tokenizer {
    tokens: Vec<Token>,
    indents: Vec<usize>,
    paren_depth: usize,
    continued: bool,
    pending: Option<PendingString>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            indents: vec![0],
            paren_depth: 0,
            continued: false,
            pending: None,
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str, start: Position, end: Position, line: &Arc<str>) {
        let token = Token::new(kind, text, start, end, Arc::clone(line));
        trace!("{token}");
        self.tokens.push(token);
    }

    /// Consume one physical line. Returns `false` once the input is exhausted.
    fn feed_line(&mut self, line: &str, row: usize) -> Result<bool, TokenizeError> {
        let line_arc: Arc<str> = Arc::from(line);
        let bytes = line.as_bytes();
        let len = line.len();
        let mut pos = 0;

        if let Some(mut pending) = self.pending.take() {
            let triple = pending.quote.len() == 3;
            if line.is_empty() {
                let kind = if triple {
                    TokenizeErrorKind::UnterminatedTripleQuotedString
                } else {
                    TokenizeErrorKind::UnterminatedString
                };
                return Err(TokenizeError::new(kind, pending.start.row, pending.start.col));
            }
            if let Some(end) = find_string_end(line, 0, pending.quote, triple) {
                pending.text.push_str(&line[..end]);
                let token = Token::new(
                    TokenKind::String,
                    pending.text,
                    pending.start,
                    Position::new(row, end),
                    pending.line,
                );
                trace!("{token}");
                self.tokens.push(token);
                pos = end;
            } else {
                if !triple && !ends_with_line_continuation(line) {
                    return Err(TokenizeError::new(
                        TokenizeErrorKind::UnterminatedString,
                        pending.start.row,
                        pending.start.col,
                    ));
                }
                pending.text.push_str(line);
                self.pending = Some(pending);
                return Ok(true);
            }
        } else if self.paren_depth == 0 && !self.continued {
            if line.is_empty() {
                return Ok(false);
            }
            let mut column = 0;
            while pos < len {
                match bytes[pos] {
                    b' ' => column += 1,
                    b'\t' => column = (column / TOKENIZER_TAB_SIZE + 1) * TOKENIZER_TAB_SIZE,
                    b'\x0c' => column = 0,
                    _ => break,
                }
                pos += 1;
            }
            if pos == len {
                return Ok(false);
            }

            // Comment-only and blank lines never open or close a block
            if matches!(bytes[pos], b'#' | b'\r' | b'\n') {
                if bytes[pos] == b'#' {
                    let comment = line[pos..].trim_end_matches(['\r', '\n']);
                    let nl_pos = pos + comment.len();
                    self.push(
                        TokenKind::Comment,
                        comment,
                        Position::new(row, pos),
                        Position::new(row, nl_pos),
                        &line_arc,
                    );
                    self.push(
                        TokenKind::Nl,
                        &line[nl_pos..],
                        Position::new(row, nl_pos),
                        Position::new(row, len),
                        &line_arc,
                    );
                } else {
                    self.push(
                        TokenKind::Nl,
                        &line[pos..],
                        Position::new(row, pos),
                        Position::new(row, len),
                        &line_arc,
                    );
                }
                return Ok(true);
            }

            let current = self.indents.last().copied().unwrap_or(0);
            if column > current {
                self.indents.push(column);
                self.push(
                    TokenKind::Indent,
                    &line[..pos],
                    Position::new(row, 0),
                    Position::new(row, pos),
                    &line_arc,
                );
            }
            while column < self.indents.last().copied().unwrap_or(0) {
                if !self.indents.contains(&column) {
                    return Err(TokenizeError::new(
                        TokenizeErrorKind::InconsistentDedent,
                        row,
                        pos,
                    ));
                }
                self.indents.pop();
                self.push(
                    TokenKind::Dedent,
                    "",
                    Position::new(row, pos),
                    Position::new(row, pos),
                    &line_arc,
                );
            }
        } else {
            if line.is_empty() {
                return Err(TokenizeError::new(TokenizeErrorKind::EofInStatement, row, 0));
            }
            self.continued = false;
        }

        while pos < len {
            let Some(found) = PSEUDO_TOKEN_RE.captures(&line[pos..]).and_then(|c| c.get(1)) else {
                pos = self.push_error_token(line, pos, row, &line_arc)?;
                continue;
            };
            let start = pos + found.start();
            let end = pos + found.end();
            pos = end;
            if start == end {
                break;
            }
            let text = &line[start..end];
            let initial = bytes[start];
            let start_pos = Position::new(row, start);
            let end_pos = Position::new(row, end);

            if initial.is_ascii_digit() || (initial == b'.' && text != "." && text != "...") {
                self.push(TokenKind::Number, text, start_pos, end_pos, &line_arc);
            } else if initial == b'\r' || initial == b'\n' {
                let kind = if self.paren_depth > 0 {
                    TokenKind::Nl
                } else {
                    TokenKind::Newline
                };
                self.push(kind, text, start_pos, end_pos, &line_arc);
            } else if initial == b'#' {
                self.push(TokenKind::Comment, text, start_pos, end_pos, &line_arc);
            } else if let Some(quote) = string_quote(text) {
                if quote.len() == 3 {
                    // Only the opening of a triple-quoted string is matched here
                    if let Some(close) = find_string_end(line, end, quote, true) {
                        self.push(
                            TokenKind::String,
                            &line[start..close],
                            start_pos,
                            Position::new(row, close),
                            &line_arc,
                        );
                        pos = close;
                    } else {
                        self.pending = Some(PendingString {
                            start: start_pos,
                            text: line[start..].to_string(),
                            quote,
                            line: Arc::clone(&line_arc),
                        });
                        break;
                    }
                } else if text.ends_with('\n') {
                    // Single-quoted string continued with a backslash
                    self.pending = Some(PendingString {
                        start: start_pos,
                        text: line[start..].to_string(),
                        quote,
                        line: Arc::clone(&line_arc),
                    });
                    break;
                } else {
                    self.push(TokenKind::String, text, start_pos, end_pos, &line_arc);
                }
            } else if initial == b'\\' {
                self.continued = true;
            } else if initial == b'_' || text.chars().next().is_some_and(char::is_alphanumeric) {
                self.push(TokenKind::Name, text, start_pos, end_pos, &line_arc);
            } else {
                match initial {
                    b'(' | b'[' | b'{' => self.paren_depth += 1,
                    b')' | b']' | b'}' => {
                        if self.paren_depth == 0 {
                            return Err(TokenizeError::new(
                                TokenizeErrorKind::UnmatchedClosingBracket,
                                row,
                                start,
                            ));
                        }
                        self.paren_depth -= 1;
                    }
                    _ => {}
                }
                self.push(TokenKind::Op, text, start_pos, end_pos, &line_arc);
            }
        }
        Ok(true)
    }

    /// Emit an unrecognized character as an error token; returns the new position.
    ///
    /// A quote that could not start a string literal means the literal is
    /// never closed on this line.
    fn push_error_token(
        &mut self,
        line: &str,
        pos: usize,
        row: usize,
        line_arc: &Arc<str>,
    ) -> Result<usize, TokenizeError> {
        let rest = &line[pos..];
        let skipped = rest.len() - rest.trim_start_matches([' ', '\t', '\x0c']).len();
        let start = pos + skipped;
        let Some(ch) = line[start..].chars().next() else {
            return Ok(line.len());
        };
        if ch == '\'' || ch == '"' {
            return Err(TokenizeError::new(
                TokenizeErrorKind::UnterminatedString,
                row,
                start,
            ));
        }
        let end = start + ch.len_utf8();
        self.push(
            TokenKind::ErrorToken,
            &line[start..end],
            Position::new(row, start),
            Position::new(row, end),
            line_arc,
        );
        Ok(end)
    }

    fn finish(mut self, lines: &[&str], row: usize) -> Result<Vec<Token>, TokenizeError> {
        if let Some(pending) = self.pending {
            return Err(TokenizeError::new(
                TokenizeErrorKind::UnterminatedTripleQuotedString,
                pending.start.row,
                pending.start.col,
            ));
        }
        let empty: Arc<str> = Arc::from("");

        // A final statement without a trailing newline still ends
        if let Some(last) = lines.last() {
            let trimmed = last.trim();
            if !last.ends_with('\n') && !trimmed.is_empty() && !trimmed.starts_with('#') {
                let last_row = lines.len();
                self.push(
                    TokenKind::Newline,
                    "",
                    Position::new(last_row, last.len()),
                    Position::new(last_row, last.len() + 1),
                    &empty,
                );
            }
        }
        for _ in 1..self.indents.len() {
            self.push(
                TokenKind::Dedent,
                "",
                Position::new(row, 0),
                Position::new(row, 0),
                &empty,
            );
        }
        self.push(
            TokenKind::EndMarker,
            "",
            Position::new(row, 0),
            Position::new(row, 0),
            &empty,
        );
        Ok(self.tokens)
    }
}

/// Quote delimiter of a string token (or string opening), if it is one
fn string_quote(text: &str) -> Option<&'static str> {
    let caps = STRING_START_RE.captures(text)?;
    match caps.get(1)?.as_str() {
        "'''" => Some("'''"),
        "\"\"\"" => Some("\"\"\""),
        "'" => Some("'"),
        "\"" => Some("\""),
        _ => None,
    }
}

/// Byte offset just past the closing quote, searching from `from`.
///
/// Backslash escapes are skipped. Single-quoted strings may not cross an
/// unescaped newline.
fn find_string_end(line: &str, from: usize, quote: &str, multiline: bool) -> Option<usize> {
    let bytes = line.as_bytes();
    let quote = quote.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(quote) {
            return Some(i + quote.len());
        }
        if !multiline && bytes[i] == b'\n' {
            return None;
        }
        i += 1;
    }
    None
}

fn ends_with_line_continuation(line: &str) -> bool {
    line.ends_with("\\\n") || line.ends_with("\\\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.kind.is_layout())
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = 1\n"),
            vec![Name, Op, Number, Newline, EndMarker]
        );
        let tokens = tokenize("x = 1\n").unwrap();
        assert_eq!(tokens[1].start, Position::new(1, 2));
        assert_eq!(tokens[1].end, Position::new(1, 3));
        assert_eq!(&*tokens[1].line, "x = 1\n");
        assert_eq!(tokens[4].start, Position::new(2, 0));
    }

    #[test]
    fn test_indent_and_dedent() {
        use TokenKind::*;
        assert_eq!(
            kinds("if x:\n    y\nz\n"),
            vec![
                Name, Name, Op, Newline, Indent, Name, Newline, Dedent, Name, Newline, EndMarker
            ]
        );
    }

    #[test]
    fn test_dedents_at_end_of_file() {
        let tokens = tokenize("def a():\n    pass\n").unwrap();
        let tail: Vec<_> = tokens.iter().rev().take(2).map(|t| t.kind).collect();
        assert_eq!(tail, vec![TokenKind::EndMarker, TokenKind::Dedent]);
        assert_eq!(tokens.last().unwrap().start, Position::new(3, 0));
    }

    #[test]
    fn test_blank_and_comment_lines() {
        use TokenKind::*;
        assert_eq!(
            kinds("\n# hello\nx\n"),
            vec![Nl, Comment, Nl, Name, Newline, EndMarker]
        );
    }

    #[test]
    fn test_comment_lines_do_not_dedent() {
        use TokenKind::*;
        assert_eq!(
            kinds("if x:\n    y\n# note\n    z\n"),
            vec![
                Name, Name, Op, Newline, Indent, Name, Newline, Comment, Nl, Name, Newline,
                Dedent, EndMarker
            ]
        );
    }

    #[test]
    fn test_newline_inside_brackets_is_nl() {
        use TokenKind::*;
        assert_eq!(
            kinds("f(a,\n  b)\n"),
            vec![Name, Op, Name, Op, Nl, Name, Op, Newline, EndMarker]
        );
    }

    #[test]
    fn test_backslash_continuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("x = 1 + \\\n    2\n"),
            vec![Name, Op, Number, Op, Number, Newline, EndMarker]
        );
    }

    #[test]
    fn test_strings_with_prefixes() {
        assert_eq!(
            texts("a = r'x\\'y' + u\"z\" + b''\n"),
            vec!["a", "=", "r'x\\'y'", "+", "u\"z\"", "+", "b''"]
        );
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        let tokens = tokenize("s = '''a\nb'''\nx\n").unwrap();
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.text, "'''a\nb'''");
        assert_eq!(string.start, Position::new(1, 4));
        assert_eq!(string.end, Position::new(2, 4));
    }

    #[test]
    fn test_triple_quoted_string_on_one_line() {
        assert_eq!(texts("\"\"\"doc\"\"\"\n"), vec!["\"\"\"doc\"\"\""]);
    }

    #[test]
    fn test_string_continued_with_backslash() {
        let tokens = tokenize("s = 'ab\\\ncd'\n").unwrap();
        let string = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(string.text, "'ab\\\ncd'");
        assert_eq!(string.end, Position::new(2, 3));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            texts("a <> b != c ** d // e\n"),
            vec!["a", "<>", "b", "!=", "c", "**", "d", "//", "e"]
        );
        assert_eq!(texts("`x`\n"), vec!["`", "x", "`"]);
    }

    #[test]
    fn test_inline_comment() {
        let tokens = tokenize("x = 1  # note\n").unwrap();
        let comment = tokens.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(comment.text, "# note");
        assert_eq!(comment.start, Position::new(1, 7));
    }

    #[test]
    fn test_missing_final_newline() {
        use TokenKind::*;
        let tokens = tokenize("x = 1").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Name, Op, Number, Newline, EndMarker]
        );
        assert_eq!(tokens[3].text, "");
        assert_eq!(tokens[3].start, Position::new(1, 5));
    }

    #[test]
    fn test_unknown_character_is_error_token() {
        let tokens = tokenize("a $ b\n").unwrap();
        let err = tokens.iter().find(|t| t.kind == TokenKind::ErrorToken).unwrap();
        assert_eq!(err.text, "$");
        assert_eq!(err.start, Position::new(1, 2));
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::EndMarker]);
    }

    #[test]
    fn test_unclosed_bracket_is_error() {
        let err = tokenize("f(1,\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::EofInStatement);
    }

    #[test]
    fn test_unmatched_closer_is_error() {
        let err = tokenize("x = 1)\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnmatchedClosingBracket);
        assert_eq!(err.position, Position::new(1, 5));
    }

    #[test]
    fn test_unterminated_strings_are_errors() {
        let err = tokenize("s = 'abc\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnterminatedString);
        let err = tokenize("s = '''abc\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::UnterminatedTripleQuotedString);
    }

    #[test]
    fn test_inconsistent_dedent_is_error() {
        let err = tokenize("if x:\n        y\n    z\n").unwrap_err();
        assert_eq!(err.kind, TokenizeErrorKind::InconsistentDedent);
        assert_eq!(err.position.row, 3);
    }

    #[test]
    fn test_split_lines_keeps_terminators() {
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b"]);
        assert!(split_lines("").is_empty());
    }
}
