//! Imports and compound statements (E401, E701, E702)

use super::{Finding, LogicalContext, LogicalRule, Rule};
use crate::parser::patterns::LAMBDA_RE;

pub struct ImportsOnSeparateLines;

impl Rule for ImportsOnSeparateLines {
    fn name(&self) -> &'static str {
        "imports_on_separate_lines"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E401"]
    }

    fn doc(&self) -> &'static str {
        "Imports should usually be on separate lines."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: import os\nimport sys",
            r"E401: import sys, os",
            r"Okay: from subprocess import Popen, PIPE",
            r"Okay: from myclas import MyClass",
            r"Okay: from foo.bar.yourclass import YourClass",
            r"Okay: import myclass",
            r"Okay: import foo.bar.yourclass",
        ]
    }
}

impl LogicalRule for ImportsOnSeparateLines {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let line = ctx.logical_line;
        if !line.starts_with("import ") {
            return None;
        }
        line.find(',')
            .map(|found| Finding::at(found, "E401", "multiple imports on one line"))
    }
}

pub struct CompoundStatements;

impl Rule for CompoundStatements {
    fn name(&self) -> &'static str {
        "compound_statements"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E701", "E702"]
    }

    fn doc(&self) -> &'static str {
        "Compound statements (multiple statements on the same line) are\n\
         generally discouraged.\n\n\
         While sometimes it's okay to put an if/for/while with a small body\n\
         on the same line, never do this for multi-clause statements. Also\n\
         avoid folding such long lines!"
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: if foo == 'blah':\n    do_blah_thing()",
            r"Okay: do_one()",
            r"Okay: do_two()",
            r"Okay: do_three()",
            r"E701: if foo == 'blah': do_blah_thing()",
            r"E701: for x in lst: total += x",
            r"E701: while t < 10: t = delay()",
            r"E701: else: do_non_blah_thing()",
            r"E701: try: something()",
            r"E701: finally: cleanup()",
            r"E701: if foo == 'blah': one(); two(); three()",
            r"E702: do_one(); do_two(); do_three()",
        ]
    }
}

impl LogicalRule for CompoundStatements {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let line = ctx.logical_line;
        if let Some(found) = line.find(':') {
            if found + 1 < line.len() {
                let before = &line[..found];
                let count = |ch: char| before.matches(ch).count();
                // Dict literals, slices, annotations and lambdas use colons too
                if count('{') <= count('}')
                    && count('[') <= count(']')
                    && count('(') <= count(')')
                    && !LAMBDA_RE.is_match(before)
                {
                    return Some(Finding::at(
                        found,
                        "E701",
                        "multiple statements on one line (colon)",
                    ));
                }
            }
        }
        line.find(';').map(|found| {
            Finding::at(found, "E702", "multiple statements on one line (semicolon)")
        })
    }
}
