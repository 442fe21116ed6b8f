//! Integration tests for pep8check
//!
//! These tests run the whole checker over complete sources

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use pep8check::parser::split_lines;
use pep8check::{Checker, CodeFilter, Config, FileReport, Registry};

const MESSY: &str = "import os, sys
def spam( a,b ):
\tif a<>b :
\t\treturn `a`
\telse:
\t\tx=[1,2 ,3]  # the list
\t\treturn x
class Eggs(object):
    def ham(self, value = 4):
        raise ValueError, 'no %s' % value



    def bacon(self):
        d = {'a':1}
        if d.has_key('a'): print(d['a'] )
";

fn no_ignore() -> Config {
    Config {
        ignore: Vec::new(),
        ..Config::default()
    }
}

fn check(source: &str, config: &Config) -> FileReport {
    let registry = Registry::new(&config.code_filter());
    Checker::new(&registry, config).check_source(source).unwrap()
}

fn fix(source: &str) -> String {
    let config = Config {
        fix: true,
        ..no_ignore()
    };
    check(source, &config).fixed.unwrap()
}

#[test]
fn test_scenario_extraneous_whitespace() {
    let report = check("spam( ham[1], {eggs: 2})\n", &no_ignore());
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.text(), "E201 whitespace after '('");
    assert_eq!(violation.row, 1);
    assert_eq!(violation.col + 1, 6);
}

#[test]
fn test_scenario_missing_operator_space() {
    let report = check("x=1\n", &no_ignore());
    assert_eq!(report.codes(), vec!["E225"]);
    assert_eq!(report.violations[0].message, "missing whitespace around operator");
    assert_eq!(report.violations[0].col, 1);
}

#[test]
fn test_scenario_tab_in_space_indented_file() {
    let report = check("if True:\n    x = 1\nif False:\n\ty = 2\n", &no_ignore());
    let e101: Vec<_> = report.violations.iter().filter(|v| v.code == "E101").collect();
    assert_eq!(e101.len(), 1);
    assert_eq!((e101[0].row, e101[0].col), (4, 0));
}

#[test]
fn test_scenario_trailing_blank_line() {
    let report = check("pass\n\n", &no_ignore());
    assert_eq!(report.codes(), vec!["W391"]);
    assert_eq!(fix("pass\n\n"), "pass\n");
}

#[test]
fn test_scenario_blank_lines_before_definition() {
    let source = "def a():\n    pass\ndef b():\n    pass\n";
    let report = check(source, &no_ignore());
    assert_eq!(report.codes(), vec!["E302"]);
    assert_eq!(report.violations[0].row, 3);
    assert_eq!(report.violations[0].col, 0);
    assert_eq!(fix(source), "def a():\n    pass\n\n\ndef b():\n    pass\n");
}

#[test]
fn test_scenario_has_key_unchanged() {
    let source = "if d.has_key(key):\n    pass\n";
    let config = Config {
        fix: true,
        ..no_ignore()
    };
    let report = check(source, &config);
    assert_eq!(report.codes(), vec!["W601"]);
    assert!(report.fixes.is_empty());
    assert_eq!(report.fixed.as_deref(), Some(source));
}

#[test]
fn test_messy_file_finds_expected_codes() {
    let report = check(MESSY, &no_ignore());
    for code in [
        "E401", "E302", "E201", "E202", "E231", "W603", "W604", "E203", "E225", "W191", "E101",
        "E251", "W602", "E303", "W601", "E701",
    ] {
        assert!(report.has(code), "{code} missing from {:?}", report.codes());
    }
}

#[test]
fn test_fix_is_idempotent() {
    let once = fix(MESSY);
    let twice = fix(&once);
    assert_eq!(once, twice);

    // Whatever is left over has no fix
    let config = Config {
        fix: true,
        ..no_ignore()
    };
    let report = check(&once, &config);
    assert!(report.fixes.is_empty(), "{:?}", report.fixes);
    for code in report.codes() {
        assert!(["E401", "W601", "E701"].contains(&code), "unexpected {code}");
    }
}

#[test]
fn test_fix_rewrites_messy_file() {
    let fixed = fix(MESSY);
    assert!(fixed.contains("def spam(a, b):\n"));
    assert!(fixed.contains("    if a != b:\n"));
    assert!(fixed.contains("        return repr(a)\n"));
    assert!(fixed.contains("        x = [1, 2, 3]  # the list\n"));
    assert!(fixed.contains("raise ValueError('no %s' % value)"));
    assert!(fixed.contains("def ham(self, value=4):"));
    assert!(fixed.contains("\n\n\nclass Eggs(object):\n"));
    assert!(!fixed.contains('\t'));
    assert!(fixed.lines().all(|line| line == line.trim_end()));
}

#[test]
fn test_reported_columns_lie_within_their_lines() {
    let report = check(MESSY, &Config { repeat: true, ..no_ignore() });
    let lines = split_lines(MESSY);
    for violation in &report.violations {
        let line = lines[violation.row - 1];
        let width = line.trim_end_matches(['\r', '\n']).chars().count();
        assert!(
            violation.col <= width,
            "{} at {}:{} beyond line of width {width}",
            violation.code,
            violation.row,
            violation.col
        );
    }
}

#[test]
fn test_punctuation_inside_strings_is_ignored() {
    let sources = [
        "x = 'a,b;c:d'\n",
        "x = \"( spam )\"\n",
        "x = '''\n  ham ,eggs\n'''\n",
        "f(r'a=b', u\"c<>d\")\n",
        "x = 'has_key(`y`)'\n",
    ];
    for source in sources {
        let report = check(source, &no_ignore());
        assert!(report.violations.is_empty(), "{source:?}: {:?}", report.codes());
    }
}

#[test]
fn test_default_ignore_hides_e24() {
    let report = check("a = (1,  2)\n", &Config::default());
    assert!(report.violations.is_empty());
    let report = check("a = (1,  2)\n", &no_ignore());
    assert_eq!(report.codes(), vec!["E241"]);
}

#[test]
fn test_select_restricts_reporting() {
    let config = Config {
        select: vec!["W6".to_string()],
        ..Config::default()
    };
    let report = check(MESSY, &config);
    assert!(!report.violations.is_empty());
    assert!(report.violations.iter().all(|v| v.code.starts_with("W6")));
}

#[test]
fn test_suppressed_findings_are_counted_not_reported() {
    let config = Config {
        ignore: vec!["E2".to_string()],
        ..Config::default()
    };
    let registry = Registry::new(&CodeFilter::allow_all());
    let report = Checker::new(&registry, &config)
        .check_source("x=f( 1 )\n")
        .unwrap();
    assert!(report.violations.is_empty());
    // One finding per rule: E225 and E201
    assert_eq!(report.suppressed, 2);
}

#[test]
fn test_ignored_codes_are_not_fixed() {
    let config = Config {
        ignore: vec!["E225".to_string()],
        fix: true,
        ..Config::default()
    };
    let report = check("x=f( 1)\n", &config);
    assert_eq!(report.fixed.as_deref(), Some("x=f(1)\n"));
}

#[test]
fn test_line_length_limit_is_configurable() {
    let source = format!("x = '{}'\n", "a".repeat(80));
    assert!(check(&source, &no_ignore()).violations.is_empty());

    let config = Config {
        max_line_length: 79,
        ..no_ignore()
    };
    let report = check(&source, &config);
    assert_eq!(report.codes(), vec!["E501"]);
    assert_eq!(report.violations[0].col, 79);
    assert_eq!(report.violations[0].message, "line too long (86 characters)");
}

#[test]
fn test_counts_lines() {
    let report = check(MESSY, &no_ignore());
    assert_eq!(report.physical_lines, 16);
    assert_eq!(report.logical_lines, 13);
}
