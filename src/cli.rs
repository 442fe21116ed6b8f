//! Command-line interface for pep8check.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

use crate::config::{split_list, DEFAULT_EXCLUDE};

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Files or directories to check
    pub inputs: Vec<PathBuf>,

    /// Status messages with -v, logical lines with -vv, tokens with -vvv
    pub verbose: u8,

    /// File names only with -q, nothing with -qq
    pub quiet: u8,

    /// Report every occurrence of a code, not only the first
    pub repeat: bool,

    /// Basename patterns to skip (comma separated on the command line)
    pub exclude: Option<Vec<String>>,

    /// Basename patterns of files to check inside directories
    pub filename: Option<Vec<String>>,

    /// Code prefixes to report
    pub select: Option<Vec<String>>,

    /// Code prefixes to skip
    pub ignore: Option<Vec<String>>,

    /// Print the offending source line under each violation
    pub show_source: bool,

    /// Print the style guide text under each violation
    pub show_pep8: bool,

    /// Print per-code counts at the end
    pub statistics: bool,

    /// Print the total count on stderr
    pub count: bool,

    /// Print processing speed at the end
    pub benchmark: bool,

    /// Directory of `#:` regression fixtures to run
    pub testsuite: Option<PathBuf>,

    /// Run the rule examples
    pub doctest: bool,

    /// Write fixed source
    pub fix: bool,

    /// With --fix, overwrite the checked files
    pub in_place: bool,

    /// Maximum allowed line length
    pub max_line_length: Option<usize>,

    /// Columns per tab when measuring indentation
    pub tab_size: Option<usize>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("pep8check")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check Python source code against the PEP 8 style conventions")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to check")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print status messages, or debug with -vv")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Report only file names, or nothing with -qq")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("repeat")
                .short('r')
                .long("repeat")
                .help("Show all occurrences of the same error")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .help(format!(
                    "Exclude files or directories which match these comma separated patterns (default: {})",
                    DEFAULT_EXCLUDE.join(",")
                ))
                .value_name("PATTERNS"),
        )
        .arg(
            Arg::new("filename")
                .long("filename")
                .help("When checking directories, only check file names matching these comma separated patterns (default: *.py)")
                .value_name("PATTERNS"),
        )
        .arg(
            Arg::new("select")
                .long("select")
                .help("Select errors and warnings (e.g. E,W6)")
                .value_name("ERRORS"),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .help("Skip errors and warnings (e.g. E4,W)")
                .value_name("ERRORS"),
        )
        .arg(
            Arg::new("show-source")
                .long("show-source")
                .help("Show source code for each error")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("show-pep8")
                .long("show-pep8")
                .help("Show text of PEP 8 for each error")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("statistics")
                .long("statistics")
                .help("Count errors and warnings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Print total number of errors and warnings to standard error")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("benchmark")
                .long("benchmark")
                .help("Measure processing speed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("testsuite")
                .long("testsuite")
                .help("Run regression tests from DIR")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("doctest")
                .long("doctest")
                .help("Run the examples of every rule")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fix")
                .short('f')
                .long("fix")
                .help("Create a new file with some things fixed to match PEP 8")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("in-place")
                .short('i')
                .long("in-place")
                .visible_alias("inplace")
                .help("Use with --fix: write fixes back to the checked files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-line-length")
                .long("max-line-length")
                .help("Maximum allowed line length [default: 120]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("tab-size")
                .long("tab-size")
                .help("Columns per tab when measuring indentation [default: 8]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Config file (overrides auto-discovery of pep8check.toml)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let list = |name: &str| matches.get_one::<String>(name).map(|value| split_list(value));

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        verbose: matches.get_count("verbose"),
        quiet: matches.get_count("quiet"),
        repeat: matches.get_flag("repeat"),
        exclude: list("exclude"),
        filename: list("filename"),
        select: list("select"),
        ignore: list("ignore"),
        show_source: matches.get_flag("show-source"),
        show_pep8: matches.get_flag("show-pep8"),
        statistics: matches.get_flag("statistics"),
        count: matches.get_flag("count"),
        benchmark: matches.get_flag("benchmark"),
        testsuite: matches.get_one::<PathBuf>("testsuite").cloned(),
        doctest: matches.get_flag("doctest"),
        fix: matches.get_flag("fix"),
        in_place: matches.get_flag("in-place"),
        max_line_length: matches.get_one::<usize>("max-line-length").copied(),
        tab_size: matches.get_one::<usize>("tab-size").copied(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        jobs: matches.get_one::<usize>("jobs").copied(),
    }
}
