//! Rules that look at one raw source line at a time

use super::{Finding, Fix, PhysicalContext, PhysicalRule, Rule};
use crate::parser::patterns::{INDENT_RE, TRAILING_WHITESPACE_RE};

/// Leading run of spaces and tabs
fn indentation(line: &str) -> &str {
    INDENT_RE.find(line).map_or("", |m| m.as_str())
}

/// Replace every tab in the indentation with four spaces
fn untabify_indentation(line: &str) -> String {
    let indent = indentation(line);
    format!("{}{}", indent.replace('\t', "    "), &line[indent.len()..])
}

pub struct TabsOrSpaces;

impl Rule for TabsOrSpaces {
    fn name(&self) -> &'static str {
        "tabs_or_spaces"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E101"]
    }

    fn doc(&self) -> &'static str {
        "Never mix tabs and spaces.\n\n\
         The most popular way of indenting Python is with spaces only. The\n\
         second-most popular way is with tabs only. Code indented with a\n\
         mixture of tabs and spaces should be converted to using spaces\n\
         exclusively."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: if a == 0:\n        a = 1\n        b = 1",
            r"E101: if a == 0:\n        a = 1\n\tb = 1",
        ]
    }
}

impl PhysicalRule for TabsOrSpaces {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        indentation(ctx.physical_line)
            .char_indices()
            .find(|&(_, ch)| Some(ch) != ctx.indent_char)
            .map(|(offset, _)| {
                Finding::at(offset, "E101", "indentation contains mixed spaces and tabs")
            })
    }

    fn fix(&self, ctx: &PhysicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "mixed tabs and spaces converted to all spaces.",
            untabify_indentation(ctx.physical_line),
        ))
    }
}

pub struct TabsObsolete;

impl Rule for TabsObsolete {
    fn name(&self) -> &'static str {
        "tabs_obsolete"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W191"]
    }

    fn doc(&self) -> &'static str {
        "For new projects, spaces-only are strongly recommended over tabs.\n\
         Most editors have features that make this easy to do."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[r"Okay: if True:\n    return", r"W191: if True:\n\treturn"]
    }
}

impl PhysicalRule for TabsObsolete {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        indentation(ctx.physical_line)
            .find('\t')
            .map(|offset| Finding::at(offset, "W191", "indentation contains tabs"))
    }

    fn fix(&self, ctx: &PhysicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "tab converted to 4 spaces.",
            untabify_indentation(ctx.physical_line),
        ))
    }
}

pub struct TrailingWhitespace;

impl Rule for TrailingWhitespace {
    fn name(&self) -> &'static str {
        "trailing_whitespace"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W291", "W293"]
    }

    fn doc(&self) -> &'static str {
        "Trailing whitespace is superfluous.\n\n\
         The warning differs when the line itself is blank, for easier\n\
         filtering by those who want to indent their blank lines."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: spam(1)",
            r"W291: spam(1)\s",
            r"W293: class Foo(object):\n    \n    bang = 12",
        ]
    }
}

impl PhysicalRule for TrailingWhitespace {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        let line = ctx
            .physical_line
            .trim_end_matches('\n')
            .trim_end_matches('\r')
            .trim_end_matches('\x0c');
        let stripped = line.trim_end();
        if line == stripped {
            return None;
        }
        if stripped.is_empty() {
            Some(Finding::at(0, "W293", "blank line contains whitespace"))
        } else {
            Some(Finding::at(stripped.len(), "W291", "trailing whitespace"))
        }
    }

    fn fix(&self, ctx: &PhysicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "whitespace stripped from end of line.",
            TRAILING_WHITESPACE_RE.replace(ctx.physical_line, "\n"),
        ))
    }
}

pub struct TrailingBlankLines;

impl Rule for TrailingBlankLines {
    fn name(&self) -> &'static str {
        "trailing_blank_lines"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W391"]
    }

    fn doc(&self) -> &'static str {
        "Trailing blank lines are superfluous."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[r"Okay: spam(1)", r"W391: spam(1)\n"]
    }
}

impl PhysicalRule for TrailingBlankLines {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        (ctx.line_number == ctx.total_lines && ctx.physical_line.trim().is_empty())
            .then(|| Finding::at(0, "W391", "blank line at end of file"))
    }

    fn fix(&self, _ctx: &PhysicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "superfluous trailing blank line removed from end of file.",
            "",
        ))
    }
}

pub struct MissingNewline;

impl Rule for MissingNewline {
    fn name(&self) -> &'static str {
        "missing_newline"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W292"]
    }

    fn doc(&self) -> &'static str {
        "The last line should have a newline."
    }
}

impl PhysicalRule for MissingNewline {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        let line = ctx.physical_line;
        (line.trim_end() == line)
            .then(|| Finding::at(line.len(), "W292", "no newline at end of file"))
    }

    fn fix(&self, ctx: &PhysicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "newline added to end of file.",
            format!("{}\n", ctx.physical_line),
        ))
    }
}

pub struct MaximumLineLength;

impl Rule for MaximumLineLength {
    fn name(&self) -> &'static str {
        "maximum_line_length"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E501"]
    }

    fn doc(&self) -> &'static str {
        "Limit all lines to a maximum of 79 characters.\n\n\
         There are still many devices around that are limited to 80\n\
         character lines; plus, limiting windows to 80 characters makes it\n\
         possible to have several windows side-by-side. For flowing long\n\
         blocks of text (docstrings or comments), limiting the length to 72\n\
         characters is recommended."
    }
}

impl PhysicalRule for MaximumLineLength {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding> {
        let line = ctx.physical_line.trim_end();
        let length = line.chars().count();
        if length <= ctx.max_line_length {
            return None;
        }
        // Point at the first character past the limit
        let offset = line
            .char_indices()
            .nth(ctx.max_line_length)
            .map_or(line.len(), |(index, _)| index);
        Some(Finding::at(
            offset,
            "E501",
            format!("line too long ({length} characters)"),
        ))
    }
}
