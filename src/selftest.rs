//! Self-test harnesses
//!
//! `--doctest` runs every rule's canonical examples through the checker.
//! `--testsuite` runs fixture files split into cases by `#:` declaration
//! lines:
//!
//! - `#: E224 W701` expects exactly those codes in the following lines
//! - `#: Okay` expects a clean case
//! - `#:` alone skips the following lines

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::config::Config;
use crate::parser::patterns::SELFTEST_RE;
use crate::process::Checker;
use crate::report::Report;
use crate::rules::Registry;
use crate::Result;

/// Outcome of a self-test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelftestSummary {
    pub passed: usize,
    pub failed: usize,
}

impl SelftestSummary {
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Split an example into its expected code and physical lines.
///
/// `\n` separates lines, `\t` stands for a tab and `\s` for a space.
#[must_use]
pub fn parse_example(example: &str) -> Option<(&str, Vec<String>)> {
    let caps = SELFTEST_RE.captures(example.trim_start())?;
    let code = caps.get(1)?.as_str();
    let source = caps.get(2)?.as_str();
    let lines = source
        .split(r"\n")
        .map(|part| format!("{}\n", part.replace(r"\t", "\t").replace(r"\s", " ")))
        .collect();
    Some((code, lines))
}

/// Check every canonical example of every registered rule.
///
/// Failures are printed as they occur; with `verbose` a summary follows.
pub fn run_doctest<W: Write>(
    registry: &Registry,
    config: &Config,
    verbose: bool,
    out: &mut W,
) -> Result<SelftestSummary> {
    let config = Config {
        fix: false,
        ..config.clone()
    };
    let checker = Checker::new(registry, &config);
    let mut summary = SelftestSummary::default();

    for (name, examples) in registry.examples() {
        debug!("doctest {name}");
        for example in examples {
            let Some((code, lines)) = parse_example(example) else {
                continue;
            };
            let source = lines.concat();
            let error = match checker.check_source(&source) {
                Err(err) => Some(format!("syntax error ({})", err.kind)),
                Ok(report) if code == "Okay" => {
                    let mut codes = report.codes();
                    codes.sort_unstable();
                    codes.dedup();
                    (!codes.is_empty()).then(|| format!("incorrectly found {}", codes.join(", ")))
                }
                Ok(report) => (!report.has(code)).then(|| format!("failed to find {code}")),
            };

            let Some(error) = error else {
                summary.passed += 1;
                continue;
            };
            summary.failed += 1;
            if let [line] = lines.as_slice() {
                writeln!(out, "pep8check: {error}: {}", line.trim_end())?;
            } else {
                writeln!(out, "pep8check: {error}:")?;
                for line in &lines {
                    writeln!(out, "{}", line.trim_end())?;
                }
            }
        }
    }

    if verbose {
        writeln!(out, "{} passed and {} failed.", summary.passed, summary.failed)?;
        if summary.success() {
            writeln!(out, "Test passed.")?;
        } else {
            writeln!(out, "Test failed.")?;
        }
    }
    Ok(summary)
}

/// Run the `#:` test cases of one fixture file.
///
/// Violations go through `report` like any other file, with the declared
/// codes marked as expected.
pub fn run_testsuite<W: Write>(
    path: &Path,
    checker: &Checker<'_>,
    report: &mut Report,
    verbose: bool,
    out: &mut W,
) -> Result<SelftestSummary> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.display().to_string();

    let mut lines: Vec<&str> = contents.split_inclusive('\n').collect();
    lines.push("#:\n");

    let mut summary = SelftestSummary::default();
    let mut codes: Vec<String> = vec!["Okay".to_string()];
    let mut testcase = String::new();
    let mut line_offset = 0;

    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with("#:") {
            if !codes.is_empty() {
                testcase.push_str(line);
            }
            continue;
        }
        if !codes.is_empty() && index > 0 {
            let label = format!("{name}:{}:1", line_offset + 1);
            codes.retain(|code| code != "Okay");

            let mut errors = match checker.check_source(&testcase) {
                Ok(file) => report.add_case(&name, &file, &codes, line_offset + 1, out)?,
                Err(err) => {
                    report.syntax_errors += 1;
                    writeln!(out, "{label}: syntax error: {err}")?;
                    1
                }
            };
            for code in &codes {
                if !report.has(code) {
                    errors += 1;
                    writeln!(out, "{label}: error {code} not found")?;
                }
            }
            if errors == 0 {
                summary.passed += 1;
                if verbose {
                    writeln!(out, "{label}: passed ({})", codes.join(" "))?;
                }
            } else {
                summary.failed += 1;
            }
            report.reset_counts();
        }
        line_offset = index;
        codes = line.split_whitespace().skip(1).map(str::to_string).collect();
        testcase.clear();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportOptions;
    use tempfile::TempDir;

    fn selftest_config() -> Config {
        Config {
            ignore: Vec::new(),
            ..Config::default()
        }
    }

    #[test]
    fn test_parse_example() {
        let (code, lines) = parse_example(r"E101: if a == 0:\n    a = 1\n\tb = 1").unwrap();
        assert_eq!(code, "E101");
        assert_eq!(lines, vec!["if a == 0:\n", "    a = 1\n", "\tb = 1\n"]);

        let (code, lines) = parse_example(r"W291: print\s").unwrap();
        assert_eq!(code, "W291");
        assert_eq!(lines, vec!["print \n"]);

        assert!(parse_example("not an example").is_none());
    }

    #[test]
    fn test_all_rule_examples_pass() {
        let config = selftest_config();
        let registry = Registry::new(&config.code_filter());
        let mut out = Vec::new();
        let summary = run_doctest(&registry, &config, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(summary.success(), "{out}");
        assert!(summary.passed > 50);
    }

    #[test]
    fn test_doctest_verbose_summary() {
        let config = selftest_config();
        let registry = Registry::new(&config.code_filter());
        let mut out = Vec::new();
        let summary = run_doctest(&registry, &config, true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with(&format!("{} passed and 0 failed.\nTest passed.\n", summary.passed)));
    }

    #[test]
    fn test_testsuite_cases() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("E22.py");
        std::fs::write(
            &path,
            "#: E225\ni=i+1\n#: Okay\ni = i + 1\n#:\nthis is ignored(\n#: E221\na = 4  + 5\n",
        )
        .unwrap();

        let config = selftest_config();
        let registry = Registry::new(&config.code_filter());
        let checker = Checker::new(&registry, &config);
        let mut report = Report::new(ReportOptions::default());
        let mut out = Vec::new();
        let summary = run_testsuite(&path, &checker, &mut report, true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(summary, SelftestSummary { passed: 3, failed: 0 }, "{out}");
        let label = path.display().to_string();
        assert!(out.contains(&format!("{label}:1:1: passed (E225)")));
        assert!(out.contains(&format!("{label}:3:1: passed ()")));
        assert!(out.contains(&format!("{label}:7:1: passed (E221)")));
    }

    #[test]
    fn test_testsuite_missing_code() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("W29.py");
        std::fs::write(&path, "#: W291\nx = 1\n").unwrap();

        let config = selftest_config();
        let registry = Registry::new(&config.code_filter());
        let checker = Checker::new(&registry, &config);
        let mut report = Report::new(ReportOptions::default());
        let mut out = Vec::new();
        let summary = run_testsuite(&path, &checker, &mut report, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(out.contains(": error W291 not found"), "{out}");
    }

    #[test]
    fn test_testsuite_unexpected_code_is_printed_with_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("E20.py");
        std::fs::write(&path, "#: Okay\nx = 1\n#: Okay\nspam( ham)\n").unwrap();

        let config = selftest_config();
        let registry = Registry::new(&config.code_filter());
        let checker = Checker::new(&registry, &config);
        let mut report = Report::new(ReportOptions::default());
        let mut out = Vec::new();
        let summary = run_testsuite(&path, &checker, &mut report, false, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(summary, SelftestSummary { passed: 1, failed: 1 });
        assert!(out.contains(&format!("{}:4:6: E201 whitespace after '('", path.display())), "{out}");
    }
}
