//! Blank lines between definitions (E301-E304)

use super::{Finding, Fix, LogicalContext, LogicalRule, Rule};
use crate::parser::patterns::DOCSTRING_RE;

pub struct BlankLines;

fn starts_definition(line: &str) -> bool {
    line.starts_with("def ") || line.starts_with("class ") || line.starts_with('@')
}

/// A method directly after a less indented line or a docstring may skip the blank line
fn blank_line_optional(ctx: &LogicalContext<'_>, blank: usize) -> bool {
    blank > 0
        || ctx.previous_indent_level < ctx.indent_level
        || DOCSTRING_RE.is_match(ctx.previous_logical)
}

impl Rule for BlankLines {
    fn name(&self) -> &'static str {
        "blank_lines"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E301", "E302", "E303", "E304"]
    }

    fn doc(&self) -> &'static str {
        "Separate top-level function and class definitions with two blank\n\
         lines.\n\n\
         Method definitions inside a class are separated by a single blank\n\
         line.\n\n\
         Extra blank lines may be used (sparingly) to separate groups of\n\
         related functions. Blank lines may be omitted between a bunch of\n\
         related one-liners (e.g. a set of dummy implementations).\n\n\
         Use blank lines in functions, sparingly, to indicate logical\n\
         sections."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: def a():\n    pass\n\n\ndef b():\n    pass",
            r"Okay: def a():\n    pass\n\n\n# Foo\n# Bar\n\ndef b():\n    pass",
            r"E301: class Foo:\n    b = 0\n    def bar():\n        pass",
            r"E302: def a():\n    pass\n\ndef b(n):\n    pass",
            r"E303: def a():\n    pass\n\n\n\ndef b(n):\n    pass",
            r"E303: def a():\n\n\n\n    pass",
            r"E304: @decorator\n\ndef a():\n    pass",
        ]
    }
}

impl LogicalRule for BlankLines {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        // Nothing is expected before a statement on the first row
        if ctx.line_number == 1 {
            return None;
        }
        let blank = ctx.blank_lines.max(ctx.blank_lines_before_comment);
        if ctx.previous_logical.starts_with('@') {
            return (blank > 0)
                .then(|| Finding::at(0, "E304", "blank lines found after function decorator"));
        }
        if blank > 2 || (ctx.indent_level > 0 && blank == 2) {
            return Some(Finding::at(0, "E303", format!("too many blank lines ({blank})")));
        }
        if !starts_definition(ctx.logical_line) {
            return None;
        }
        if ctx.indent_level > 0 {
            (!blank_line_optional(ctx, blank))
                .then(|| Finding::at(0, "E301", "expected 1 blank line, found 0"))
        } else {
            (blank != 2).then(|| {
                Finding::at(0, "E302", format!("expected 2 blank lines, found {blank}"))
            })
        }
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        const DESCRIPTION: &str = "blank lines before statement adjusted.";
        if ctx.line_number == 1 {
            return None;
        }
        let expected = if ctx.indent_level > 0 { 1 } else { 2 };
        let blank = ctx.blank_lines.max(ctx.blank_lines_before_comment);
        if ctx.previous_logical.starts_with('@') {
            return (blank > 0).then(|| Fix::blank_lines(DESCRIPTION, 0));
        }
        if blank > expected {
            return Some(Fix::blank_lines(DESCRIPTION, expected));
        }
        if !starts_definition(ctx.logical_line) {
            return None;
        }
        if ctx.indent_level > 0 {
            (!blank_line_optional(ctx, blank)).then(|| Fix::blank_lines(DESCRIPTION, 1))
        } else {
            (blank != 2).then(|| Fix::blank_lines(DESCRIPTION, 2))
        }
    }
}
