//! Whitespace in expressions and statements (E2xx)

use super::{is_keyword, Finding, Fix, LogicalContext, LogicalRule, Rule};
use crate::parser::patterns::{
    EXTRANEOUS_WHITESPACE_RE, SEPARATOR_WHITESPACE_RE, WHITESPACE_AROUND_NAMED_PARAMETER_RE,
    WHITESPACE_AROUND_OPERATOR_RE,
};
use crate::parser::{tokenize, Position, Token, TokenKind};

const BINARY_OPERATORS: &[&str] = &[
    "**=", "*=", "+=", "-=", "!=", "<>", "%=", "^=", "&=", "|=", "==", "/=", "//=", "<=", ">=",
    "<<=", ">>=", "%", "^", "&", "|", "=", "/", "//", "<", ">", "<<",
];

const UNARY_OPERATORS: &[&str] = &[">>", "**", "*", "+", "-"];

fn is_operator(text: &str) -> bool {
    BINARY_OPERATORS.contains(&text) || UNARY_OPERATORS.contains(&text)
}

fn is_closing_bracket(text: &str) -> bool {
    matches!(text, ")" | "]" | "}")
}

/// Keywords after which `-x`, `*args` and friends are unary
fn is_unary_context_keyword(text: &str) -> bool {
    text == "print" || (is_keyword(text) && !matches!(text, "False" | "None" | "True"))
}

/// Tokens that carry statement content
fn content_tokens(tokens: &[Token]) -> impl Iterator<Item = &Token> {
    tokens
        .iter()
        .filter(|t| !t.kind.is_layout() && !matches!(t.kind, TokenKind::Comment | TokenKind::ErrorToken))
}

pub struct ExtraneousWhitespace;

impl Rule for ExtraneousWhitespace {
    fn name(&self) -> &'static str {
        "extraneous_whitespace"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E201", "E202", "E203"]
    }

    fn doc(&self) -> &'static str {
        "Avoid extraneous whitespace in the following situations:\n\n\
         - Immediately inside parentheses, brackets or braces.\n\n\
         - Immediately before a comma, semicolon, or colon."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: spam(ham[1], {eggs: 2})",
            r"E201: spam( ham[1], {eggs: 2})",
            r"E201: spam(ham[ 1], {eggs: 2})",
            r"E201: spam(ham[1], { eggs: 2})",
            r"E202: spam(ham[1], {eggs: 2} )",
            r"E202: spam(ham[1 ], {eggs: 2})",
            r"E202: spam(ham[1], {eggs: 2 })",
            r"E203: if x == 4: print x, y; x, y = y , x",
            r"E203: if x == 4: print x, y ; x, y = y, x",
            r"E203: if x == 4 : print x, y; x, y = y, x",
        ]
    }
}

impl LogicalRule for ExtraneousWhitespace {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let line = ctx.logical_line;
        for found in EXTRANEOUS_WHITESPACE_RE.find_iter(line) {
            let start = found.start();
            let Some(ch) = found.as_str().chars().find(|c| *c != ' ') else {
                continue;
            };
            if "([{".contains(ch) {
                return Some(Finding::at(start + 1, "E201", format!("whitespace after '{ch}'")));
            }
            if follows_comma(line, start) {
                continue;
            }
            if "}])".contains(ch) {
                return Some(Finding::at(start, "E202", format!("whitespace before '{ch}'")));
            }
            return Some(Finding::at(start, "E203", format!("whitespace before '{ch}'")));
        }
        None
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let line = ctx.logical_line;
        let mut fixed = String::with_capacity(line.len());
        let mut last = 0;
        for found in EXTRANEOUS_WHITESPACE_RE.find_iter(line) {
            let text = found.as_str();
            if text.starts_with(' ') && follows_comma(line, found.start()) {
                continue;
            }
            fixed.push_str(&line[last..found.start()]);
            fixed.push_str(text.trim());
            last = found.end();
        }
        fixed.push_str(&line[last..]);
        Some(Fix::line(
            "whitespace removed inside brackets and before punctuation.",
            fixed,
        ))
    }
}

/// A comma before the space allows `(1, )`
fn follows_comma(line: &str, start: usize) -> bool {
    start
        .checked_sub(1)
        .and_then(|i| line.as_bytes().get(i))
        .is_some_and(|&b| b == b',')
}

pub struct MissingWhitespace;

/// Byte offsets of `, ; :` that need a following space
fn separators_missing_space(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    for index in 0..bytes.len().saturating_sub(1) {
        let ch = bytes[index];
        let next = bytes[index + 1];
        if !b",;:".contains(&ch) || next == b' ' || next == b'\t' {
            continue;
        }
        let before = &bytes[..index];
        let count = |b: u8| before.iter().filter(|&&c| c == b).count();
        // Slice syntax
        if ch == b':' && count(b'[') > count(b']') {
            continue;
        }
        // One-element tuple or list: (3,)
        if ch == b',' && (next == b')' || next == b']') {
            continue;
        }
        found.push(index);
    }
    found
}

impl Rule for MissingWhitespace {
    fn name(&self) -> &'static str {
        "missing_whitespace"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E231"]
    }

    fn doc(&self) -> &'static str {
        "Each comma, semicolon or colon should be followed by whitespace."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: [a, b]",
            r"Okay: (3,)",
            r"Okay: a[1:4]",
            r"Okay: a[:4]",
            r"Okay: a[1:]",
            r"Okay: a[1:4:2]",
            r"E231: ['a','b']",
            r"E231: foo(bar,baz)",
        ]
    }
}

impl LogicalRule for MissingWhitespace {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let line = ctx.logical_line;
        let index = *separators_missing_space(line).first()?;
        let ch = char::from(line.as_bytes()[index]);
        Some(Finding::at(index, "E231", format!("missing whitespace after '{ch}'")))
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let mut line = ctx.logical_line.to_string();
        for index in separators_missing_space(ctx.logical_line).into_iter().rev() {
            line.insert(index + 1, ' ');
        }
        Some(Fix::line("space added after separator.", line))
    }
}

pub struct WhitespaceBeforeParameters;

impl Rule for WhitespaceBeforeParameters {
    fn name(&self) -> &'static str {
        "whitespace_before_parameters"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E211"]
    }

    fn doc(&self) -> &'static str {
        "Avoid extraneous whitespace in the following situations:\n\n\
         - Immediately before the open parenthesis that starts the argument\n  \
           list of a function call.\n\n\
         - Immediately before the open parenthesis that starts an indexing\n  \
           or slicing."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: spam(1)",
            r"E211: spam (1)",
            r"Okay: dict['key'] = list[index]",
            r"E211: dict ['key'] = list[index]",
            r"E211: dict['key'] = list [index]",
        ]
    }
}

impl LogicalRule for WhitespaceBeforeParameters {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let tokens: Vec<&Token> = content_tokens(ctx.tokens).collect();
        for (index, pair) in tokens.windows(2).enumerate() {
            let (prev, token) = (pair[0], pair[1]);
            let opens_call = token.kind == TokenKind::Op && matches!(token.text.as_str(), "(" | "[");
            if opens_call
                && token.start != prev.end
                && (prev.kind == TokenKind::Name || is_closing_bracket(&prev.text))
                // `class A (B):` is allowed
                && (index == 0 || tokens[index - 1].text != "class")
                // `return (a.foo for a in range(5))`
                && !is_keyword(&prev.text)
            {
                return Some(Finding::at_position(
                    prev.end,
                    "E211",
                    format!("whitespace before '{}'", token.text),
                ));
            }
        }
        None
    }
}

pub struct WhitespaceAroundOperator;

impl Rule for WhitespaceAroundOperator {
    fn name(&self) -> &'static str {
        "whitespace_around_operator"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E221", "E222", "E223", "E224"]
    }

    fn doc(&self) -> &'static str {
        "Avoid extraneous whitespace in the following situations:\n\n\
         - More than one space around an assignment (or other) operator to\n  \
           align it with another."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: a = 12 + 3",
            r"E221: a = 4  + 5",
            r"E222: a = 4 +  5",
            r"E223: a = 4\t+ 5",
            r"E224: a = 4 +\t5",
        ]
    }
}

impl LogicalRule for WhitespaceAroundOperator {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        for caps in WHITESPACE_AROUND_OPERATOR_RE.captures_iter(ctx.logical_line) {
            let (Some(before), Some(space), Some(after)) = (caps.get(1), caps.get(2), caps.get(3)) else {
                continue;
            };
            let tab = space.as_str() == "\t";
            if is_operator(before.as_str()) {
                return Some(if tab {
                    Finding::at(space.start(), "E224", "tab after operator")
                } else {
                    Finding::at(space.start(), "E222", "multiple spaces after operator")
                });
            }
            if is_operator(after.as_str()) {
                return Some(if tab {
                    Finding::at(space.start(), "E223", "tab before operator")
                } else {
                    Finding::at(space.start(), "E221", "multiple spaces before operator")
                });
            }
        }
        None
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let mut line = ctx.logical_line.to_string();
        let matches: Vec<_> = WHITESPACE_AROUND_OPERATOR_RE
            .captures_iter(ctx.logical_line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let before = caps.get(1)?.as_str();
                let after = caps.get(3)?.as_str();
                (is_operator(before) || is_operator(after))
                    .then(|| (whole.range(), format!("{before} {after}")))
            })
            .collect();
        for (range, replacement) in matches.into_iter().rev() {
            line.replace_range(range, &replacement);
        }
        Some(Fix::line("whitespace around operator collapsed.", line))
    }
}

pub struct MissingWhitespaceAroundOperator;

/// Positions where a space is missing next to an operator, in source order.
///
/// A position directly before the operator is reported first; if the
/// operand after it is also glued on, the position after follows.
fn operator_space_gaps(tokens: &[Token]) -> Vec<Position> {
    let mut gaps = Vec::new();
    let mut parens: usize = 0;
    let mut need_space = false;
    let mut prev: Option<&Token> = None;

    for token in content_tokens(tokens) {
        let text = token.text.as_str();
        if text == "(" || text == "lambda" {
            parens += 1;
        } else if text == ")" {
            parens = parens.saturating_sub(1);
        }
        if let Some(prev_token) = prev {
            if need_space {
                if token.start != prev_token.end {
                    need_space = false;
                } else if !(text == ">" && prev_token.text == "<") {
                    gaps.push(prev_token.end);
                    need_space = false;
                }
            } else if token.kind == TokenKind::Op {
                if text == "=" && parens > 0 {
                    // Keyword arguments and defaults: foo(bar=None)
                } else if BINARY_OPERATORS.contains(&text) {
                    need_space = true;
                } else if UNARY_OPERATORS.contains(&text) {
                    need_space = match prev_token.kind {
                        TokenKind::Op => is_closing_bracket(&prev_token.text),
                        TokenKind::Name => !is_unary_context_keyword(&prev_token.text),
                        _ => true,
                    };
                }
                if need_space && token.start == prev_token.end {
                    gaps.push(token.start);
                }
            }
        }
        prev = Some(token);
    }
    gaps
}

impl Rule for MissingWhitespaceAroundOperator {
    fn name(&self) -> &'static str {
        "missing_whitespace_around_operator"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E225"]
    }

    fn doc(&self) -> &'static str {
        "- Always surround these binary operators with a single space on\n  \
           either side: assignment (=), augmented assignment (+=, -= etc.),\n  \
           comparisons (==, <, >, !=, <>, <=, >=, in, not in, is, is not),\n  \
           Booleans (and, or, not).\n\n\
         - Use spaces around arithmetic operators."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: i = i + 1",
            r"Okay: submitted += 1",
            r"Okay: x = x * 2 - 1",
            r"Okay: hypot2 = x * x + y * y",
            r"Okay: c = (a + b) * (a - b)",
            r"Okay: foo(bar, key='word', *args, **kwargs)",
            r"Okay: baz(**kwargs)",
            r"Okay: negative = -1",
            r"Okay: spam(-1)",
            r"Okay: alpha[:-i]",
            r"Okay: if not -5 < x < +5:\n    pass",
            r"Okay: lambda *args, **kw: (args, kw)",
            r"E225: i=i+1",
            r"E225: submitted +=1",
            r"E225: x = x*2 - 1",
            r"E225: hypot2 = x*x + y*y",
            r"E225: c = (a+b) * (a-b)",
            r"E225: c = alpha -4",
            r"E225: z = x **y",
        ]
    }
}

impl LogicalRule for MissingWhitespaceAroundOperator {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        operator_space_gaps(ctx.tokens)
            .first()
            .map(|&position| Finding::at_position(position, "E225", "missing whitespace around operator"))
    }

    /// Re-tokenizes the current text so earlier fixes are taken into account
    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let tokens = tokenize(&format!("{}\n", ctx.logical_line)).ok()?;
        let mut line = ctx.logical_line.to_string();
        let mut gaps: Vec<usize> = operator_space_gaps(&tokens)
            .into_iter()
            .filter(|position| position.row == 1)
            .map(|position| position.col)
            .collect();
        gaps.dedup();
        for col in gaps.into_iter().rev() {
            if line.is_char_boundary(col) {
                line.insert(col, ' ');
            }
        }
        Some(Fix::line("whitespace added around operator.", line))
    }
}

pub struct WhitespaceAroundComma;

impl Rule for WhitespaceAroundComma {
    fn name(&self) -> &'static str {
        "whitespace_around_comma"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E241", "E242"]
    }

    fn doc(&self) -> &'static str {
        "Avoid extraneous whitespace in the following situations:\n\n\
         - More than one space around an assignment (or other) operator to\n  \
           align it with another.\n\n\
         This also applies around commas, semicolons and colons. These\n\
         checks are disabled by default."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[r"Okay: a = (1, 2)", r"E241: a = (1,  2)", r"E242: a = (1,\t2)"]
    }
}

impl LogicalRule for WhitespaceAroundComma {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let line = ctx.logical_line;
        for separator in [',', ';', ':'] {
            if let Some(found) = line.find(&format!("{separator}  ")) {
                return Some(Finding::at(
                    found + 1,
                    "E241",
                    format!("multiple spaces after '{separator}'"),
                ));
            }
            if let Some(found) = line.find(&format!("{separator}\t")) {
                return Some(Finding::at(found + 1, "E242", format!("tab after '{separator}'")));
            }
        }
        None
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let fixed = SEPARATOR_WHITESPACE_RE.replace_all(ctx.logical_line, |caps: &regex::Captures<'_>| {
            format!("{} ", caps[0].trim())
        });
        Some(Fix::line("whitespace after separator collapsed.", fixed))
    }
}

pub struct WhitespaceAroundNamedParameterEquals;

impl Rule for WhitespaceAroundNamedParameterEquals {
    fn name(&self) -> &'static str {
        "whitespace_around_named_parameter_equals"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E251"]
    }

    fn doc(&self) -> &'static str {
        "Don't use spaces around the '=' sign when used to indicate a\n\
         keyword argument or a default parameter value."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: def complex(real, imag=0.0):",
            r"Okay: return magic(r=real, i=imag)",
            r"Okay: boolean(a == b)",
            r"Okay: boolean(a != b)",
            r"Okay: boolean(a <= b)",
            r"Okay: boolean(a >= b)",
            r"E251: def complex(real, imag = 0.0):",
            r"E251: return magic(r = real, i = imag)",
        ]
    }
}

/// Spaced `=` matches are exactly three characters long
fn is_spaced_equals(text: &str) -> bool {
    text.chars().count() == 3
}

impl LogicalRule for WhitespaceAroundNamedParameterEquals {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let mut parens: usize = 0;
        for found in WHITESPACE_AROUND_NAMED_PARAMETER_RE.find_iter(ctx.logical_line) {
            let text = found.as_str();
            if parens > 0 && is_spaced_equals(text) {
                return Some(Finding::at(
                    found.start(),
                    "E251",
                    "no spaces around keyword / parameter equals",
                ));
            }
            match text {
                "(" => parens += 1,
                ")" => parens = parens.saturating_sub(1),
                _ => {}
            }
        }
        None
    }

    fn fix(&self, ctx: &LogicalContext<'_>) -> Option<Fix> {
        let mut line = ctx.logical_line.to_string();
        let found: Vec<_> = WHITESPACE_AROUND_NAMED_PARAMETER_RE
            .find_iter(ctx.logical_line)
            .collect();
        // Walk backwards: a `)` opens the region, its `(` closes it
        let mut parens: usize = 0;
        for m in found.into_iter().rev() {
            let text = m.as_str();
            if parens > 0 && is_spaced_equals(text) {
                line.replace_range(m.range(), text.trim());
            }
            match text {
                ")" => parens += 1,
                "(" => parens = parens.saturating_sub(1),
                _ => {}
            }
        }
        Some(Fix::line("spaces around keyword equals removed.", line))
    }
}

pub struct WhitespaceBeforeInlineComment;

impl Rule for WhitespaceBeforeInlineComment {
    fn name(&self) -> &'static str {
        "whitespace_before_inline_comment"
    }

    fn codes(&self) -> &'static [&'static str] {
        &["E261", "E262"]
    }

    fn doc(&self) -> &'static str {
        "Separate inline comments by at least two spaces.\n\n\
         An inline comment is a comment on the same line as a statement.\n\
         Inline comments should be separated by at least two spaces from the\n\
         statement. They should start with a # and a single space."
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            r"Okay: x = x + 1  # Increment x",
            r"Okay: x = x + 1    # Increment x",
            r"E261: x = x + 1 # Increment x",
            r"E262: x = x + 1  #Increment x",
            r"E262: x = x + 1  #  Increment x",
        ]
    }
}

impl LogicalRule for WhitespaceBeforeInlineComment {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding> {
        let mut prev_end = Position::default();
        for token in ctx.tokens {
            if token.kind.is_layout() {
                continue;
            }
            if token.kind != TokenKind::Comment {
                prev_end = token.end;
                continue;
            }
            // Comments on a line of their own are not inline
            let before = token.line.get(..token.start.col).unwrap_or("");
            if before.trim().is_empty() {
                continue;
            }
            if prev_end.row == token.start.row && token.start.col < prev_end.col + 2 {
                return Some(Finding::at_position(
                    prev_end,
                    "E261",
                    "at least two spaces before inline comment",
                ));
            }
            let (symbol, comment) = token.text.split_once(' ').unwrap_or((token.text.as_str(), ""));
            let bad_prefix = symbol != "#" && symbol != "#:";
            if bad_prefix || comment.starts_with(char::is_whitespace) {
                return Some(Finding::at_position(
                    token.start,
                    "E262",
                    "inline comment should start with '# '",
                ));
            }
        }
        None
    }
}
