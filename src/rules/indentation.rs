//! Indentation of statements (E111-E113)

use super::{Finding, LogicalContext, LogicalRule, Rule};

/// Spaces per indentation level
const INDENT_SIZE: usize = 4;

pub struct Indentation;

impl Rule for Indentation {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E111", "E112", "E113"]
    }

    fn doc(&self) -> &'static str {
        "Use 4 spaces per indentation level.\n\n\
         For really old code that you don't want to mess up, you can\n\
         continue to use 8-space tabs."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: a = 1",
            r"Okay: if a == 0:\n    a = 1",
            r"E111:   a = 1",
            r"Okay: for item in items:\n    pass",
            r"E112: for item in items:\npass",
            r"Okay: a = 1\nb = 2",
            r"E113: a = 1\n    b = 2",
        ]
    }
}

impl LogicalRule for Indentation {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        if ctx.indent_char == Some(' ') && ctx.indent_level % INDENT_SIZE != 0 {
            return Some(Finding::at(0, "E111", "indentation is not a multiple of four"));
        }
        let indent_expected = ctx.previous_logical.ends_with(':');
        if indent_expected && ctx.indent_level <= ctx.previous_indent_level {
            return Some(Finding::at(0, "E112", "expected an indented block"));
        }
        if ctx.indent_level > ctx.previous_indent_level && !indent_expected {
            return Some(Finding::at(0, "E113", "unexpected indentation"));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::logical_ctx;

    fn code(previous: &str, previous_level: usize, level: usize) -> Option<&'static str> {
        let ctx = LogicalContext {
            previous_logical: previous,
            previous_indent_level: previous_level,
            indent_level: level,
            ..logical_ctx("pass", &[])
        };
        Indentation.check(&ctx).map(|f| f.code)
    }

    #[test]
    fn test_multiple_of_four() {
        assert_eq!(code("if x:", 0, 2), Some("E111"));
        assert_eq!(code("if x:", 0, 4), None);
        assert_eq!(code("if x:", 0, 8), None);
    }

    #[test]
    fn test_tab_indented_files_skip_multiple_of_four() {
        let ctx = LogicalContext {
            indent_char: Some('\t'),
            previous_logical: "if x:",
            indent_level: 6,
            ..logical_ctx("pass", &[])
        };
        assert!(Indentation.check(&ctx).is_none());
    }

    #[test]
    fn test_expected_indent() {
        assert_eq!(code("for item in items:", 0, 0), Some("E112"));
        assert_eq!(code("for item in items:", 4, 4), Some("E112"));
    }

    #[test]
    fn test_unexpected_indent() {
        assert_eq!(code("a = 1", 0, 4), Some("E113"));
        // Dedenting is always fine
        assert_eq!(code("a = 1", 8, 4), None);
    }
}
