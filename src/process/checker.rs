//! Per-file state machine
//!
//! Walks the token stream once. Physical lines are checked as soon as the
//! tokens reach them; a `NEWLINE` outside brackets closes a logical line,
//! which is rebuilt and handed to every logical rule. Blank lines, standalone
//! comments and indentation history are tracked between statements.

use tracing::{debug, trace};

use super::fixer;
use crate::config::{CodeFilter, Config};
use crate::error::TokenizeError;
use crate::parser::{expand_indent, split_lines, tokenize, LogicalLine, Token, TokenKind};
use crate::rules::{Edit, Finding, Fix, LogicalContext, Offset, PhysicalContext, Registry};

/// One reported style violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: &'static str,
    /// 1-based row
    pub row: usize,
    /// 0-based character column
    pub col: usize,
    pub message: String,
    /// Offending source line without its terminator
    pub source_line: String,
    /// Documentation of the rule that reported it
    pub doc: &'static str,
}

impl Violation {
    /// `CODE message`
    #[must_use]
    pub fn text(&self) -> String {
        format!("{} {}", self.code, self.message)
    }
}

/// A fix that was applied while checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixNotice {
    /// Index of the triggering violation in [`FileReport::violations`]
    pub violation: usize,
    pub description: &'static str,
    pub old: String,
    pub new: String,
}

/// Everything learned about one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Violations whose code is not suppressed, in detection order
    pub violations: Vec<Violation>,
    /// Number of findings dropped by the select/ignore filter
    pub suppressed: usize,
    pub physical_lines: usize,
    pub logical_lines: usize,
    pub fixes: Vec<FixNotice>,
    /// Rewritten source, when fixing
    pub fixed: Option<String>,
}

impl FileReport {
    /// Codes of all violations, in detection order
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.code).collect()
    }

    #[must_use]
    pub fn has(&self, code: &str) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }
}

/// Runs the registered rules over source text
pub struct Checker<'a> {
    registry: &'a Registry,
    config: &'a Config,
    filter: CodeFilter,
}

impl<'a> Checker<'a> {
    #[must_use]
    pub fn new(registry: &'a Registry, config: &'a Config) -> Self {
        Self {
            registry,
            config,
            filter: config.code_filter(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.config
    }

    /// Check one file's contents.
    ///
    /// Fails only when the source cannot be tokenized.
    pub fn check_source(&self, source: &str) -> Result<FileReport, TokenizeError> {
        let tokens = tokenize(source)?;
        let lines = split_lines(source);
        let mut state = FileState::new(self, &lines);
        state.run(&tokens);
        Ok(state.finish())
    }
}

/// Mutable state of one pass over a file
struct FileState<'c> {
    registry: &'c Registry,
    config: &'c Config,
    filter: &'c CodeFilter,
    lines: &'c [&'c str],
    /// Physical lines after physical fixes, one per checked row
    fixed_lines: Vec<String>,
    indent_char: Option<char>,
    indent_level: usize,
    previous_indent_level: usize,
    previous_logical: String,
    blank_lines: usize,
    blank_lines_before_comment: usize,
    /// Standalone comment waiting for its `NL`, with the blank lines before it
    pending_comment: Option<(usize, String)>,
    /// Standalone comments written out together with the next statement
    comments: Vec<(usize, String)>,
    bracket_depth: usize,
    report: FileReport,
    output: Option<String>,
}

impl<'c> FileState<'c> {
    fn new(checker: &'c Checker<'_>, lines: &'c [&'c str]) -> Self {
        Self {
            registry: checker.registry,
            config: checker.config,
            filter: &checker.filter,
            lines,
            fixed_lines: Vec::with_capacity(lines.len()),
            indent_char: None,
            indent_level: 0,
            previous_indent_level: 0,
            previous_logical: String::new(),
            blank_lines: 0,
            blank_lines_before_comment: 0,
            pending_comment: None,
            comments: Vec::new(),
            bracket_depth: 0,
            report: FileReport::default(),
            output: checker.config.fix.then(String::new),
        }
    }

    fn run(&mut self, tokens: &[Token]) {
        // Tokens of the statement being collected are always `tokens[start..=index]`
        let mut start = 0;
        for (index, token) in tokens.iter().enumerate() {
            self.check_physical_through(token.end.row);
            let run = &tokens[start..=index];
            match token.kind {
                TokenKind::Op => match token.text.as_str() {
                    "(" | "[" | "{" => self.bracket_depth += 1,
                    ")" | "]" | "}" => self.bracket_depth = self.bracket_depth.saturating_sub(1),
                    _ => {}
                },
                TokenKind::Newline if self.bracket_depth == 0 => {
                    self.check_logical(run);
                    self.blank_lines = 0;
                    self.blank_lines_before_comment = 0;
                    start = index + 1;
                }
                TokenKind::Nl if self.bracket_depth == 0 => {
                    self.flush_comment();
                    if run.len() == 1 {
                        self.blank_lines += 1;
                    }
                    start = index + 1;
                }
                TokenKind::Comment => self.note_comment(token, run.len() == 1),
                TokenKind::EndMarker => {
                    self.check_logical(run);
                    start = index + 1;
                }
                _ => {}
            }
        }
    }

    fn finish(mut self) -> FileReport {
        self.check_physical_through(self.lines.len());
        self.flush_comment();
        self.write_comments();
        self.report.physical_lines = self.lines.len();
        self.report.fixed = self.output;
        self.report
    }

    fn note_comment(&mut self, token: &Token, standalone: bool) {
        let blank_before = self.blank_lines;
        let before = token.line.get(..token.start.col).unwrap_or("");
        if before.trim().is_empty() {
            self.blank_lines_before_comment = self.blank_lines_before_comment.max(self.blank_lines);
            self.blank_lines = 0;
        }
        if standalone {
            let line = self
                .fixed_lines
                .get(token.start.row - 1)
                .map_or(&*token.line, String::as_str);
            self.pending_comment = Some((blank_before, line.trim_end().to_string()));
        }
    }

    fn flush_comment(&mut self) {
        if let Some(comment) = self.pending_comment.take() {
            if self.fixing() {
                self.comments.push(comment);
            }
        }
    }

    fn write_comments(&mut self) {
        let comments = std::mem::take(&mut self.comments);
        if let Some(output) = self.output.as_mut() {
            for (blank_lines, comment) in &comments {
                fixer::write_comment(output, *blank_lines, comment);
            }
        }
    }

    fn fixing(&self) -> bool {
        self.output.is_some()
    }

    /// Record a finding unless its code is suppressed; returns its index
    fn record(&mut self, finding: &Finding, row: usize, col: usize, doc: &'static str) -> Option<usize> {
        if self.filter.is_suppressed(finding.code) {
            self.report.suppressed += 1;
            return None;
        }
        let source_line = line_text(self.lines, row).to_string();
        self.report.violations.push(Violation {
            code: finding.code,
            row,
            col,
            message: finding.message.clone(),
            source_line,
            doc,
        });
        Some(self.report.violations.len() - 1)
    }

    fn notice(&mut self, violation: usize, fix: &Fix, old: String, new: String) {
        self.report.fixes.push(FixNotice {
            violation,
            description: fix.description,
            old,
            new,
        });
    }

    fn check_physical_through(&mut self, row: usize) {
        let last = row.min(self.lines.len());
        while self.fixed_lines.len() < last {
            let row = self.fixed_lines.len() + 1;
            let line = self.check_physical(row);
            self.fixed_lines.push(line);
        }
    }

    /// Run every physical rule on one row; returns the (possibly fixed) line
    fn check_physical(&mut self, row: usize) -> String {
        let registry = self.registry;
        let original = self.lines[row - 1];
        if self.indent_char.is_none() {
            self.indent_char = original.chars().next().filter(|c| matches!(c, ' ' | '\t'));
        }
        let mut line = original.to_string();
        for rule in registry.physical() {
            let ctx = PhysicalContext {
                physical_line: &line,
                indent_char: self.indent_char,
                line_number: row,
                total_lines: self.lines.len(),
                max_line_length: self.config.max_line_length,
            };
            let Some(finding) = rule.check(&ctx) else {
                continue;
            };
            let byte_col = match finding.offset {
                Offset::Column(col) => col,
                Offset::Position(position) => position.col,
            };
            let fix = if self.fixing() && !self.filter.is_suppressed(finding.code) {
                rule.fix(&ctx)
            } else {
                None
            };
            let col = char_column(&line, byte_col);
            let Some(index) = self.record(&finding, row, col, rule.doc()) else {
                continue;
            };
            if let Some(fix) = fix {
                if let Edit::Line(new) = &fix.edit {
                    if *new != line {
                        self.notice(index, &fix, line.clone(), new.clone());
                        line.clone_from(new);
                    }
                }
            }
        }
        line
    }

    fn check_logical(&mut self, run: &[Token]) {
        let Some(logical) = LogicalLine::build(run, self.lines) else {
            return;
        };
        self.report.logical_lines += 1;

        let start = logical.start();
        let first_line = line_text(self.lines, start.row);
        let indent = first_line.get(..start.col).unwrap_or("");
        self.previous_indent_level = self.indent_level;
        self.indent_level = expand_indent(indent, self.config.tab_size);
        debug!("{}", logical.text.chars().take(80).collect::<String>().trim_end());

        let registry = self.registry;
        let previous_logical = std::mem::take(&mut self.previous_logical);
        let mut text = logical.text.clone();
        // Blank lines in front of the statement, comments in between included
        let mut blank_lines = self.blank_lines.max(self.blank_lines_before_comment);
        let mut blank_lines_fixed = false;

        for rule in registry.logical() {
            trace!("   {}", rule.name());
            let ctx = LogicalContext {
                logical_line: &text,
                tokens: run,
                indent_char: self.indent_char,
                line_number: start.row,
                indent_level: self.indent_level,
                previous_indent_level: self.previous_indent_level,
                previous_logical: &previous_logical,
                blank_lines: self.blank_lines,
                blank_lines_before_comment: self.blank_lines_before_comment,
            };
            let Some(finding) = rule.check(&ctx) else {
                continue;
            };
            let position = match finding.offset {
                Offset::Column(col) => logical.resolve(col, self.lines),
                Offset::Position(position) => position,
            };
            let fix = if self.fixing() && !self.filter.is_suppressed(finding.code) {
                rule.fix(&ctx)
            } else {
                None
            };
            let col = char_column(line_text(self.lines, position.row), position.col);
            let Some(index) = self.record(&finding, position.row, col, rule.doc()) else {
                continue;
            };
            let Some(fix) = fix else {
                continue;
            };
            match &fix.edit {
                Edit::Line(new) if *new != text => {
                    self.notice(index, &fix, text.clone(), new.clone());
                    text.clone_from(new);
                }
                Edit::BlankLines(count) if *count != blank_lines => {
                    self.notice(
                        index,
                        &fix,
                        format!("{}{text}", "\n".repeat(blank_lines)),
                        format!("{}{text}", "\n".repeat(*count)),
                    );
                    blank_lines = *count;
                    blank_lines_fixed = true;
                }
                _ => {}
            }
        }

        let own_blank_lines = if blank_lines_fixed {
            fixer::fit_blank_lines(&mut self.comments, self.blank_lines, blank_lines)
        } else {
            self.blank_lines
        };
        self.write_comments();
        if let Some(output) = self.output.as_mut() {
            fixer::write_logical(output, &logical, &text, own_blank_lines, &self.fixed_lines);
        }
        self.previous_logical = text;
    }
}

fn line_text<'a>(lines: &[&'a str], row: usize) -> &'a str {
    lines
        .get(row.wrapping_sub(1))
        .map_or("", |line| line.trim_end_matches(['\r', '\n']))
}

/// Character column of a byte offset; offsets past the end count as bytes
fn char_column(line: &str, byte_col: usize) -> usize {
    match line.get(..byte_col) {
        Some(prefix) => prefix.chars().count(),
        None if byte_col > line.len() => line.chars().count() + (byte_col - line.len()),
        None => byte_col,
    }
}
