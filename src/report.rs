//! Aggregated results across a run
//!
//! [`Report`] prints violations as files are merged into it and keeps the
//! per-code counters behind `--statistics`, `--count` and `--benchmark`.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

use crate::process::{FileReport, Violation};

/// Output switches taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// 1 prints only file names, 2 or more prints nothing
    pub quiet: u8,
    pub repeat: bool,
    pub show_source: bool,
    pub show_pep8: bool,
}

#[derive(Debug, Default)]
pub struct Report {
    options: ReportOptions,
    counts: BTreeMap<&'static str, usize>,
    /// First message seen for every code
    messages: BTreeMap<&'static str, String>,
    pub directories: usize,
    pub files: usize,
    pub logical_lines: usize,
    pub physical_lines: usize,
    pub syntax_errors: usize,
}

impl Report {
    #[must_use]
    pub fn new(options: ReportOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> ReportOptions {
        self.options
    }

    /// Merge one file's results, printing what the options ask for.
    ///
    /// Returns the number of violations that count against the file.
    pub fn add_file<W: Write>(&mut self, path: &str, file: &FileReport, out: &mut W) -> io::Result<usize> {
        self.add_case(path, file, &[], 0, out)
    }

    /// Like [`Report::add_file`] for a test case that starts after
    /// `line_offset` lines of its file and is expected to report `expected`.
    ///
    /// Expected codes are counted but neither printed nor returned.
    pub fn add_case<W: Write>(
        &mut self,
        path: &str,
        file: &FileReport,
        expected: &[String],
        line_offset: usize,
        out: &mut W,
    ) -> io::Result<usize> {
        self.logical_lines += file.logical_lines;
        self.physical_lines += file.physical_lines;

        let mut file_errors = 0;
        for (index, violation) in file.violations.iter().enumerate() {
            let count = self.counts.entry(violation.code).or_insert(0);
            *count += 1;
            let first = *count == 1;
            self.messages
                .entry(violation.code)
                .or_insert_with(|| violation.message.clone());

            if self.options.quiet == 1 && index == 0 {
                writeln!(out, "{path}")?;
            }
            if self.options.quiet == 0 && !expected.iter().any(|code| code == violation.code) {
                file_errors += 1;
                if first || self.options.repeat {
                    self.write_violation(path, violation, line_offset, out)?;
                }
            }
            if self.options.quiet == 0 {
                for notice in file.fixes.iter().filter(|notice| notice.violation == index) {
                    writeln!(
                        out,
                        " - pep8 fix: {}\n\t-{}\n\t+{}",
                        notice.description,
                        notice.old.replace('\n', "\\n"),
                        notice.new.replace('\n', "\\n")
                    )?;
                }
            }
        }
        if self.options.quiet > 0 {
            file_errors = file
                .violations
                .iter()
                .filter(|v| !expected.iter().any(|code| code == v.code))
                .count();
        }
        Ok(file_errors)
    }

    fn write_violation<W: Write>(
        &self,
        path: &str,
        violation: &Violation,
        line_offset: usize,
        out: &mut W,
    ) -> io::Result<()> {
        writeln!(
            out,
            "{path}:{}:{}: {}",
            line_offset + violation.row,
            violation.col + 1,
            violation.text()
        )?;
        if self.options.show_source {
            writeln!(out, "{}", violation.source_line.trim_end())?;
            writeln!(out, "{}^", " ".repeat(violation.col))?;
        }
        if self.options.show_pep8 {
            writeln!(out, "{}", violation.doc.trim())?;
        }
        Ok(())
    }

    /// Total occurrences of codes starting with `prefix`
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.counts
            .iter()
            .filter(|(code, _)| code.starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }

    /// Whether `code` was seen since the last reset
    #[must_use]
    pub fn has(&self, code: &str) -> bool {
        self.counts.get(code).is_some_and(|&count| count > 0)
    }

    /// Codes seen since the last reset, sorted
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.counts.keys().copied().collect()
    }

    /// `count code message` for every code starting with `prefix`, sorted by code
    #[must_use]
    pub fn statistics(&self, prefix: &str) -> Vec<String> {
        self.counts
            .iter()
            .filter(|(code, _)| code.starts_with(prefix))
            .map(|(code, count)| {
                let message = self.messages.get(code).map_or("", String::as_str);
                format!("{count:<7} {code} {message}")
            })
            .collect()
    }

    pub fn write_statistics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in self.statistics("") {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Elapsed time and throughput for each counter
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write_benchmark<W: Write>(&self, elapsed: Duration, out: &mut W) -> io::Result<()> {
        let seconds = elapsed.as_secs_f64().max(f64::EPSILON);
        writeln!(out, "{:<7.2} seconds elapsed", elapsed.as_secs_f64())?;
        for (key, total) in self.benchmark_counters() {
            let rate = (total as f64 / seconds) as u64;
            writeln!(out, "{rate:<7} {key} per second ({total} total)")?;
        }
        Ok(())
    }

    fn benchmark_counters(&self) -> [(&'static str, usize); 4] {
        [
            ("directories", self.directories),
            ("files", self.files),
            ("logical lines", self.logical_lines),
            ("physical lines", self.physical_lines),
        ]
    }

    /// Forget per-code counters and messages; throughput counters stay
    pub fn reset_counts(&mut self) {
        self.counts.clear();
        self.messages.clear();
    }
}
