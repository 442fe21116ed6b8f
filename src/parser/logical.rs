//! Logical line reconstruction
//!
//! A logical line is one statement rebuilt from its tokens as a single
//! string. Row breaks inside brackets collapse to at most one space, string
//! literals are masked so their contents cannot trip any rule, and a mapping
//! table translates offsets in the rebuilt text back to source positions.

use super::token::{Position, Token, TokenKind};

/// Filler byte used when masking string contents
const MASK_CHAR: char = 'x';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogicalLine {
    /// Normalized statement text (right-trimmed, never starts with whitespace)
    pub text: String,
    /// `(offset in text, source start)` for every contributing token, sorted by offset
    pub mapping: Vec<(usize, Position)>,
    /// Original text of every masked string literal, in order
    pub masked_strings: Vec<String>,
    /// Trailing inline comment together with the whitespace in front of it
    pub comment: Option<String>,
    pub first_row: usize,
    pub last_row: usize,
}

impl LogicalLine {
    /// Rebuild a statement from its tokens.
    ///
    /// `lines` are the physical lines of the file (with terminators). Returns
    /// `None` when the run holds no content tokens.
    #[must_use]
    pub fn build(tokens: &[Token], lines: &[&str]) -> Option<Self> {
        let mut logical = Self::default();
        let mut previous: Option<&Token> = None;

        for token in tokens {
            if token.kind.is_layout() {
                continue;
            }
            if token.kind == TokenKind::Comment {
                if let Some(prev) = previous {
                    if prev.end.row == token.start.row {
                        let source = row_text(lines, token.start.row);
                        logical.comment = source
                            .get(prev.end.col..token.end.col)
                            .map(str::to_string);
                    }
                }
                continue;
            }

            let masked;
            let text = if token.kind == TokenKind::String {
                logical.masked_strings.push(token.text.clone());
                masked = mute_string(&token.text);
                masked.as_str()
            } else {
                token.text.as_str()
            };

            if let Some(prev) = previous {
                let (end_row, end_col) = (prev.end.row, prev.end.col);
                let (start_row, start_col) = (token.start.row, token.start.col);
                if end_row != start_row {
                    let prev_char = row_text(lines, end_row)
                        .as_bytes()
                        .get(end_col.wrapping_sub(1))
                        .copied()
                        .unwrap_or(b' ');
                    if prev_char == b','
                        || (!b"{[(".contains(&prev_char) && !matches!(text, "}" | "]" | ")"))
                    {
                        logical.text.push(' ');
                    }
                } else if end_col < start_col {
                    if let Some(fill) = row_text(lines, end_row).get(end_col..start_col) {
                        logical.text.push_str(fill);
                    }
                }
            } else {
                logical.first_row = token.start.row;
            }

            logical.mapping.push((logical.text.len(), token.start));
            logical.text.push_str(text);
            logical.last_row = logical.last_row.max(token.end.row);
            previous = Some(token);
        }

        previous?;
        let trimmed = logical.text.trim_end().len();
        logical.text.truncate(trimmed);
        Some(logical)
    }

    /// Source position of the first token
    #[must_use]
    pub fn start(&self) -> Position {
        self.mapping.first().map(|(_, pos)| *pos).unwrap_or_default()
    }

    /// Whether the statement occupies exactly one physical row
    #[must_use]
    pub fn is_single_row(&self) -> bool {
        self.first_row == self.last_row
    }

    /// Translate an offset in `text` to a source position.
    ///
    /// Uses the last token starting at or before `offset`; the column is
    /// clamped so it never runs past the end of that physical row.
    #[must_use]
    pub fn resolve(&self, offset: usize, lines: &[&str]) -> Position {
        let index = self.mapping.partition_point(|(start, _)| *start <= offset);
        let Some(&(token_offset, token_start)) = self.mapping.get(index.saturating_sub(1)) else {
            return Position::new(self.first_row, 0);
        };
        let col = token_start.col + offset.saturating_sub(token_offset);
        let row_len = row_text(lines, token_start.row)
            .trim_end_matches(['\r', '\n'])
            .len();
        Position::new(token_start.row, col.min(row_len))
    }
}

fn row_text<'a>(lines: &[&'a str], row: usize) -> &'a str {
    lines.get(row.wrapping_sub(1)).copied().unwrap_or("")
}

/// Replace the contents of a string literal with filler of the same byte length.
///
/// Prefix letters and the quote delimiters are kept.
#[must_use]
pub fn mute_string(text: &str) -> String {
    let quote = if text.ends_with('"') {
        '"'
    } else if text.ends_with('\'') {
        '\''
    } else {
        return text.to_string();
    };
    let Some(first_quote) = text.find(quote) else {
        return text.to_string();
    };
    let mut start = first_quote + 1;
    let mut end = text.len() - 1;
    if text.ends_with("\"\"\"") || text.ends_with("'''") {
        start += 2;
        end = end.saturating_sub(2);
    }
    if end <= start {
        return text.to_string();
    }
    let mut muted = String::with_capacity(text.len());
    muted.push_str(&text[..start]);
    muted.extend(std::iter::repeat(MASK_CHAR).take(end - start));
    muted.push_str(&text[end..]);
    muted
}

/// Width of the leading whitespace, tabs expanded to the next multiple of `tab_size`
#[must_use]
pub fn expand_indent(line: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    let mut result = 0;
    for ch in line.chars() {
        match ch {
            '\t' => result = result / tab_size * tab_size + tab_size,
            ' ' => result += 1,
            _ => break,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenizer::{split_lines, tokenize};

    fn logical(source: &str) -> LogicalLine {
        let tokens = tokenize(source).unwrap();
        let lines = split_lines(source);
        LogicalLine::build(&tokens, &lines).unwrap()
    }

    #[test]
    fn test_mute_string() {
        assert_eq!(mute_string("\"abc\""), "\"xxx\"");
        assert_eq!(mute_string("'''abc'''"), "'''xxx'''");
        assert_eq!(mute_string("r'abc'"), "r'xxx'");
        assert_eq!(mute_string("u\"\""), "u\"\"");
        assert_eq!(mute_string("'a\nb'"), "'xxx'");
    }

    #[test]
    fn test_mute_string_keeps_byte_length() {
        let original = "'héllo'";
        assert_eq!(mute_string(original).len(), original.len());
    }

    #[test]
    fn test_expand_indent() {
        assert_eq!(expand_indent("    ", 4), 4);
        assert_eq!(expand_indent("\t", 4), 4);
        assert_eq!(expand_indent("    \t", 4), 8);
        assert_eq!(expand_indent("       \t", 4), 8);
        assert_eq!(expand_indent("        \t", 4), 12);
        assert_eq!(expand_indent("\tx", 8), 8);
        assert_eq!(expand_indent("  x  ", 8), 2);
    }

    #[test]
    fn test_same_row_whitespace_is_copied() {
        let line = logical("spam( ham[1],  {eggs: 2})\n");
        assert_eq!(line.text, "spam( ham[1],  {eggs: 2})");
        assert!(line.is_single_row());
    }

    #[test]
    fn test_row_break_collapses_to_one_space() {
        let line = logical("x = [1,\n     2,\n     3]\n");
        assert_eq!(line.text, "x = [1, 2, 3]");
        assert_eq!(line.first_row, 1);
        assert_eq!(line.last_row, 3);
        assert!(!line.is_single_row());
    }

    #[test]
    fn test_no_space_after_opener_or_before_closer() {
        let line = logical("f(\n    a\n)\n");
        assert_eq!(line.text, "f(a)");
    }

    #[test]
    fn test_backslash_continuation_joins_rows() {
        let line = logical("x = 1 + \\\n    2\n");
        assert_eq!(line.text, "x = 1 + 2");
    }

    #[test]
    fn test_strings_are_masked() {
        let line = logical("x = f('a, b', \"c:d\")\n");
        assert_eq!(line.text, "x = f('xxxx', \"xxx\")");
        assert_eq!(line.masked_strings, vec!["'a, b'", "\"c:d\""]);
    }

    #[test]
    fn test_trailing_comment_is_kept_aside() {
        let line = logical("x = 1  # note\n");
        assert_eq!(line.text, "x = 1");
        assert_eq!(line.comment.as_deref(), Some("  # note"));
    }

    #[test]
    fn test_mapping_covers_every_token() {
        let line = logical("y = (1,\n     2)\n");
        let offsets: Vec<usize> = line.mapping.iter().map(|(offset, _)| *offset).collect();
        assert_eq!(offsets, vec![0, 2, 4, 5, 6, 8, 9]);
        assert_eq!(line.mapping[5].1, Position::new(2, 5));
        assert_eq!(line.start(), Position::new(1, 0));
    }

    #[test]
    fn test_resolve_translates_offsets() {
        let source = "x = [1,\n     2]\n";
        let lines = split_lines(source);
        let line = logical(source);
        assert_eq!(line.text, "x = [1, 2]");
        // '2' sits at offset 8 in the logical text
        assert_eq!(line.resolve(8, &lines), Position::new(2, 5));
        // '=' is on the first row
        assert_eq!(line.resolve(2, &lines), Position::new(1, 2));
    }

    #[test]
    fn test_resolve_clamps_to_row() {
        let source = "x = [1,\n     2]\n";
        let lines = split_lines(source);
        let line = logical(source);
        // The inserted space after the comma belongs to the ',' token on row 1
        let pos = line.resolve(7, &lines);
        assert_eq!(pos.row, 1);
        assert!(pos.col <= "x = [1,".len());
    }

    #[test]
    fn test_layout_only_run_builds_nothing() {
        let tokens = tokenize("\n\n").unwrap();
        let lines = split_lines("\n\n");
        assert!(LogicalLine::build(&tokens, &lines).is_none());
    }
}
