//! Style rules and the registry that selects them.
//!
//! Rules come in two disjoint kinds:
//! - [`PhysicalRule`]: sees one raw source line at a time
//! - [`LogicalRule`]: sees one statement rebuilt by [`crate::parser::LogicalLine`]
//!
//! Every rule is a stateless unit struct. Checks report at most one
//! [`Finding`] per invocation; fixes hand back an [`Edit`] the checker applies
//! to the text the next rule sees.

pub mod blank_lines;
pub mod deprecated;
pub mod indentation;
pub mod physical;
pub mod statements;
pub mod whitespace;

use crate::config::CodeFilter;
use crate::parser::{Position, Token};

/// Where a finding points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// Byte offset into the text the rule was given
    Column(usize),
    /// Already a source position (token-based rules)
    Position(Position),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub offset: Offset,
    pub code: &'static str,
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn at(column: usize, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            offset: Offset::Column(column),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn at_position(position: Position, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            offset: Offset::Position(position),
            code,
            message: message.into(),
        }
    }
}

/// Replacement produced by a rule's fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// New text for the line the rule was given
    Line(String),
    /// New number of blank lines in front of the statement
    BlankLines(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Human readable summary, announced when fixing
    pub description: &'static str,
    pub edit: Edit,
}

impl Fix {
    #[must_use]
    pub fn line(description: &'static str, text: impl Into<String>) -> Self {
        Self {
            description,
            edit: Edit::Line(text.into()),
        }
    }

    #[must_use]
    pub fn blank_lines(description: &'static str, count: usize) -> Self {
        Self {
            description,
            edit: Edit::BlankLines(count),
        }
    }
}

/// Everything a physical-line rule may look at
#[derive(Debug, Clone, Copy)]
pub struct PhysicalContext<'a> {
    /// Raw line including its terminator (possibly already fixed by an earlier rule)
    pub physical_line: &'a str,
    /// First indentation character seen in the file
    pub indent_char: Option<char>,
    /// 1-based row of the line
    pub line_number: usize,
    /// Number of physical lines in the file
    pub total_lines: usize,
    pub max_line_length: usize,
}

/// Everything a logical-line rule may look at
#[derive(Debug, Clone, Copy)]
pub struct LogicalContext<'a> {
    /// Normalized statement text, string contents masked
    pub logical_line: &'a str,
    /// Raw tokens of the statement, comments and layout tokens included
    pub tokens: &'a [Token],
    pub indent_char: Option<char>,
    /// 1-based row where the statement starts
    pub line_number: usize,
    pub indent_level: usize,
    pub previous_indent_level: usize,
    /// Text of the previous statement; empty for the first statement of a file
    pub previous_logical: &'a str,
    pub blank_lines: usize,
    pub blank_lines_before_comment: usize,
}

/// Shared description of every rule
pub trait Rule: Send + Sync {
    /// Stable identifier, also used to order rules
    fn name(&self) -> &'static str;

    /// Codes the rule can report
    fn codes(&self) -> &'static [&'static str];

    /// Style guide text shown with `--show-pep8`
    fn doc(&self) -> &'static str;

    /// Canonical examples: `Okay: source` or `CODE: source`, with `\n`, `\t`
    /// and `\s` written as escapes
    fn examples(&self) -> &'static [&'static str] {
        &[]
    }
}

pub trait PhysicalRule: Rule {
    fn check(&self, ctx: &PhysicalContext<'_>) -> Option<Finding>;

    fn fix(&self, _ctx: &PhysicalContext<'_>) -> Option<Fix> {
        None
    }
}

pub trait LogicalRule: Rule {
    fn check(&self, ctx: &LogicalContext<'_>) -> Option<Finding>;

    fn fix(&self, _ctx: &LogicalContext<'_>) -> Option<Fix> {
        None
    }
}

const PHYSICAL_RULES: &[&dyn PhysicalRule] = &[
    &physical::TabsOrSpaces,
    &physical::TabsObsolete,
    &physical::TrailingWhitespace,
    &physical::TrailingBlankLines,
    &physical::MissingNewline,
    &physical::MaximumLineLength,
];

const LOGICAL_RULES: &[&dyn LogicalRule] = &[
    &blank_lines::BlankLines,
    &whitespace::ExtraneousWhitespace,
    &whitespace::MissingWhitespace,
    &indentation::Indentation,
    &whitespace::WhitespaceBeforeParameters,
    &whitespace::WhitespaceAroundOperator,
    &whitespace::MissingWhitespaceAroundOperator,
    &whitespace::WhitespaceAroundComma,
    &whitespace::WhitespaceAroundNamedParameterEquals,
    &whitespace::WhitespaceBeforeInlineComment,
    &statements::ImportsOnSeparateLines,
    &statements::CompoundStatements,
    &deprecated::HasKey,
    &deprecated::RaiseComma,
    &deprecated::NotEqual,
    &deprecated::Backticks,
];

/// The rules that can still report something under a given filter
#[derive(Clone)]
pub struct Registry {
    physical: Vec<&'static dyn PhysicalRule>,
    logical: Vec<&'static dyn LogicalRule>,
}

impl Registry {
    /// Build the rule lists, sorted by name.
    ///
    /// A rule is dropped when every one of its codes is suppressed.
    #[must_use]
    pub fn new(filter: &CodeFilter) -> Self {
        let mut physical: Vec<&'static dyn PhysicalRule> = PHYSICAL_RULES
            .iter()
            .copied()
            .filter(|rule| !filter.suppresses_all(rule.codes()))
            .collect();
        physical.sort_by_key(|rule| rule.name());

        let mut logical: Vec<&'static dyn LogicalRule> = LOGICAL_RULES
            .iter()
            .copied()
            .filter(|rule| !filter.suppresses_all(rule.codes()))
            .collect();
        logical.sort_by_key(|rule| rule.name());

        Self { physical, logical }
    }

    #[must_use]
    pub fn physical(&self) -> &[&'static dyn PhysicalRule] {
        &self.physical
    }

    #[must_use]
    pub fn logical(&self) -> &[&'static dyn LogicalRule] {
        &self.logical
    }

    /// `(rule name, examples)` for every registered rule, physical rules first
    #[must_use]
    pub fn examples(&self) -> Vec<(&'static str, &'static [&'static str])> {
        self.physical
            .iter()
            .map(|rule| (rule.name(), rule.examples()))
            .chain(self.logical.iter().map(|rule| (rule.name(), rule.examples())))
            .collect()
    }

    /// Documentation of the rule owning `code`
    #[must_use]
    pub fn doc_for(&self, code: &str) -> Option<&'static str> {
        self.physical
            .iter()
            .find(|rule| rule.codes().contains(&code))
            .map(|rule| rule.doc())
            .or_else(|| {
                self.logical
                    .iter()
                    .find(|rule| rule.codes().contains(&code))
                    .map(|rule| rule.doc())
            })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("physical", &self.physical.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("logical", &self.logical.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Python 2 and 3 keywords
pub(crate) const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "exec", "finally", "for", "from",
    "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print",
    "raise", "return", "try", "while", "with", "yield",
];

pub(crate) fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}
