//! Constructs removed in Python 3 (W601-W604)

use super::{Finding, Fix, LogicalContext, LogicalRule, Rule};
use crate::parser::patterns::RAISE_COMMA_RE;

pub struct HasKey;

impl Rule for HasKey {
    fn name(&self) -> &'static str {
        "python_3000_has_key"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W601"]
    }

    fn doc(&self) -> &'static str {
        "The {}.has_key() method will be removed in the future version of\n\
         Python. Use the 'in' operation instead, like:\n\
         d = {\"a\": 1, \"b\": 2}\n\
         if \"b\" in d:\n    print d[\"b\"]"
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: if key in d:\n    pass",
            r"W601: if d.has_key(key):\n    pass",
        ]
    }
}

impl LogicalRule for HasKey {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        ctx.logical_line
            .find(".has_key(")
            .map(|pos| Finding::at(pos, "W601", ".has_key() is deprecated, use 'in'"))
    }
}

pub struct RaiseComma;

impl Rule for RaiseComma {
    fn name(&self) -> &'static str {
        "python_3000_raise_comma"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W602"]
    }

    fn doc(&self) -> &'static str {
        "When raising an exception, use \"raise ValueError('message')\"\n\
         instead of the older form \"raise ValueError, 'message'\".\n\n\
         The paren-using form is preferred because when the exception\n\
         arguments are long or include string formatting, you don't need to\n\
         use line continuation characters thanks to the containing\n\
         parentheses. The older form will be removed in Python 3000."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: raise DummyError('Message')",
            r"W602: raise DummyError, 'Message'",
        ]
    }
}

impl LogicalRule for RaiseComma {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let caps = RAISE_COMMA_RE.captures(ctx.logical_line)?;
        let exception = caps.get(1)?;
        Some(Finding::at(
            exception.start(),
            "W602",
            "deprecated form of raising exception",
        ))
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let fixed = RAISE_COMMA_RE.replace(ctx.logical_line, "raise $1($2)");
        Some(Fix::line("exception raised with a call.", fixed))
    }
}

pub struct NotEqual;

impl Rule for NotEqual {
    fn name(&self) -> &'static str {
        "python_3000_not_equal"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W603"]
    }

    fn doc(&self) -> &'static str {
        "!= can also be written <>, but this is an obsolete usage kept for\n\
         backwards compatibility only. New code should always use !=.\n\
         The older syntax is removed in Python 3000."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[r"Okay: if a != 'b':\n    pass", r"W603: if a <> 'b':\n    pass"]
    }
}

impl LogicalRule for NotEqual {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        ctx.logical_line
            .find("<>")
            .map(|pos| Finding::at(pos, "W603", "'<>' is deprecated, use '!='"))
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        Some(Fix::line(
            "'<>' replaced with '!='.",
            ctx.logical_line.replace("<>", "!="),
        ))
    }
}

pub struct Backticks;

impl Rule for Backticks {
    fn name(&self) -> &'static str {
        "python_3000_backticks"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["W604"]
    }

    fn doc(&self) -> &'static str {
        "Backticks are removed in Python 3000.\nUse repr() instead."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[r"Okay: val = repr(1 + 2)", r"W604: val = `1 + 2`"]
    }
}

impl LogicalRule for Backticks {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        ctx.logical_line
            .find('`')
            .map(|pos| Finding::at(pos, "W604", "backticks are deprecated, use 'repr()'"))
    }

    /// Rewrites balanced pairs only
    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let line = ctx.logical_line;
        if line.matches('`').count() % 2 != 0 {
            return None;
        }
        let mut fixed = String::with_capacity(line.len() + 8);
        let mut open = false;
        for ch in line.chars() {
            if ch == '`' {
                fixed.push_str(if open { ")" } else { "repr(" });
                open = !open;
            } else {
                fixed.push(ch);
            }
        }
        Some(Fix::line("backticks replaced with repr().", fixed))
    }
}
