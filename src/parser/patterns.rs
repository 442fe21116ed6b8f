/// Regex patterns for Python source and style rules
///
/// All patterns are compiled once at first use via `LazyLock`.
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

fn group(choices: &[&str]) -> String {
    format!("(?:{})", choices.join("|"))
}

// ===== TOKENIZER =====

const WHITESPACE: &str = r"[ \f\t]*";
const COMMENT: &str = r"#[^\r\n]*";
const NAME: &str = r"\w+";
const STRING_PREFIX: &str = r"(?:[rR][bBfF]?|[uUbBfF][rR]?)?";

fn number_pattern() -> String {
    let digits = r"[0-9](?:_?[0-9])*";
    let hex = r"0[xX](?:_?[0-9a-fA-F])+[lL]?";
    let bin = r"0[bB](?:_?[01])+[lL]?";
    let oct = r"0[oO]?(?:_?[0-7])+[lL]?";
    let dec = r"(?:0(?:_?0)*|[1-9](?:_?[0-9])*)[lL]?";
    let exponent = format!(r"[eE][-+]?{digits}");
    let point_float = format!(
        r"{}(?:{exponent})?",
        group(&[&format!(r"{digits}\.(?:{digits})?"), &format!(r"\.{digits}")])
    );
    let exp_float = format!("{digits}{exponent}");
    let float = group(&[&point_float, &exp_float]);
    let imag = group(&[&format!("{digits}[jJ]"), &format!("{float}[jJ]")]);
    let int = group(&[hex, bin, oct, dec]);
    group(&[&imag, &float, &int])
}

fn operator_pattern() -> String {
    let operator = group(&[
        r"\*\*=?",
        r">>=?",
        r"<<=?",
        r"<>",
        r"!=",
        r"//=?",
        r"->",
        r"[+\-*/%&@|^=<>]=?",
        r"~",
    ]);
    let bracket = r"[\[\](){}]";
    let special = group(&[r"\r?\n", r"\.\.\.", r":=", r"[:;.,`@]"]);
    group(&[&operator, bracket, &special])
}

fn cont_str_pattern() -> String {
    group(&[
        &format!(r#"{STRING_PREFIX}'[^\n'\\]*(?:\\.[^\n'\\]*)*(?:'|\\\r?\n)"#),
        &format!(r#"{STRING_PREFIX}"[^\n"\\]*(?:\\.[^\n"\\]*)*(?:"|\\\r?\n)"#),
    ])
}

/// One pseudo-token at the start of the haystack; group 1 is the token.
///
/// Alternation order matters: a string prefix must win over a plain name.
pub static PSEUDO_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let triple = group(&[
        &format!("{STRING_PREFIX}'''"),
        &format!(r#"{STRING_PREFIX}""""#),
    ]);
    let extras = group(&[r"\\\r?\n|\z", COMMENT, &triple]);
    build_re(&format!(
        "^{WHITESPACE}({})",
        group(&[
            &extras,
            &number_pattern(),
            &operator_pattern(),
            &cont_str_pattern(),
            NAME
        ])
    ))
});

/// Opening of a string literal: optional prefix, then the quote run
pub static STRING_START_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r#"^{STRING_PREFIX}('''|"""|'|")"#)));

// ===== RULES =====

pub static INDENT_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^([ \t]*)"));

pub static RAISE_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^raise\s+(\w+)\s*,\s*(.*)\s*"));

pub static DOCSTRING_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r#"^u?r?["']"#));

pub static WHITESPACE_AROUND_OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"([^\w\s]*)\s*(\t|  )\s*([^\w\s]*)"));

/// One bracket or separator with a single space on its inner side
pub static EXTRANEOUS_WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"[\[({] | [\]}),;:]"));

pub static WHITESPACE_AROUND_NAMED_PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"[()]|\s=[^=]|[^=!<>]=\s"));

/// Separator followed by a whitespace run
pub static SEPARATOR_WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"[,;:][ \t]+"));

pub static TRAILING_WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"[ \n\r\t]+$"));

pub static LAMBDA_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\blambda\b"));

/// Canonical rule example: `Okay: source` or `E225: source`
pub static SELFTEST_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^(Okay|[EW]\d{3}):\s(.*)$"));
