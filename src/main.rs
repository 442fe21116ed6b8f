//! pep8check - Python style checker

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use glob::Pattern;
use pep8check::process::{check_file, Checker, FileReport};
use pep8check::selftest::{run_doctest, run_testsuite};
use pep8check::{parse_args, CheckError, CliArgs, Config, Registry, Report, ReportOptions, Result};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

fn main() -> Result<ExitCode> {
    let args = parse_args();
    init_logging(args.verbose);

    let mut inputs = args.inputs.clone();
    if let Some(dir) = &args.testsuite {
        inputs.push(dir.clone());
    }
    if inputs.is_empty() && !args.doctest {
        anyhow::bail!("input not specified (try --help)");
    }

    let config = build_config(&args)?;
    let registry = Registry::new(&config.code_filter());
    debug!("{registry:?}");

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let mut report = Report::new(ReportOptions {
        quiet: args.quiet,
        repeat: config.repeat,
        show_source: config.show_source,
        show_pep8: config.show_pep8,
    });
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = false;

    if args.doctest {
        let summary = run_doctest(&registry, &config, args.verbose > 0, &mut out)?;
        failed |= !summary.success();
    }

    let start = Instant::now();
    let files = collect_files(&inputs, &config, &mut report);
    let checker = Checker::new(&registry, &config);

    if args.testsuite.is_some() {
        for path in &files {
            let summary = run_testsuite(path, &checker, &mut report, args.verbose > 0, &mut out)?;
            failed |= !summary.success();
        }
    } else {
        let use_sequential = args.jobs == Some(1);
        failed |= check_files(&files, &checker, &mut report, use_sequential, &mut out)?;
    }
    let elapsed = start.elapsed();

    if args.statistics {
        report.write_statistics(&mut out)?;
    }
    if args.benchmark {
        report.write_benchmark(elapsed, &mut out)?;
    }
    out.flush()?;

    let count = report.count("");
    if count > 0 && args.count {
        eprintln!("{count}");
    }
    if count > 0 || report.syntax_errors > 0 || failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Log to stderr; `-v` raises the level, `RUST_LOG` overrides it
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pep8check={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Build configuration from discovered or explicit config files and CLI args
fn build_config(args: &CliArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!("using explicit config file: {}", config_path.display());
        Config::from_toml_file(config_path)?
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        for found in Config::discover_config_files(&cwd) {
            debug!("discovered config file: {}", found.display());
        }
        Config::from_discovered_files(&cwd)
    };

    // Override with CLI arguments
    if let Some(select) = &args.select {
        config.select.clone_from(select);
    }
    if let Some(ignore) = &args.ignore {
        config.ignore.clone_from(ignore);
    } else if args.select.is_some() {
        config.ignore.clear();
    } else if args.doctest || args.testsuite.is_some() {
        // Every rule has to run against its examples
        config.ignore.clear();
    }
    if let Some(exclude) = &args.exclude {
        config.exclude = exclude
            .iter()
            .map(|pattern| pattern.trim_end_matches('/').to_string())
            .collect();
    }
    if let Some(filename) = &args.filename {
        config.filename.clone_from(filename);
    }
    if let Some(max_line_length) = args.max_line_length {
        config.max_line_length = max_line_length;
    }
    if let Some(tab_size) = args.tab_size {
        config.tab_size = tab_size;
    }
    if args.repeat {
        config.repeat = true;
    }
    if args.show_source {
        config.show_source = true;
    }
    if args.show_pep8 {
        config.show_pep8 = true;
    }
    if args.fix {
        config.fix = true;
    }
    if args.in_place {
        config.in_place = true;
    }

    debug!("configuration: {config:?}");

    // Validate configuration
    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns.iter().filter_map(|p| Pattern::new(p).ok()).collect()
}

/// Check if the basename of a path matches any pattern
fn matches_basename(path: &Path, patterns: &[Pattern]) -> bool {
    let name = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
    patterns.iter().any(|pattern| pattern.matches(&name))
}

/// Collect the files to check, counting directories and files in `report`.
///
/// Directories are walked in sorted order; excluded directories are pruned
/// and only file names matching the `filename` patterns are kept.
fn collect_files(inputs: &[PathBuf], config: &Config, report: &mut Report) -> Vec<PathBuf> {
    let exclude = compile_patterns(&config.exclude);
    let filename = compile_patterns(&config.filename);
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            if !matches_basename(input, &exclude) {
                report.files += 1;
                files.push(input.clone());
            }
            continue;
        }
        let walker = WalkDir::new(input)
            .follow_links(true)
            .max_depth(256)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !matches_basename(entry.path(), &exclude));
        for entry in walker.filter_map(std::result::Result::ok) {
            let path = entry.path();
            if entry.file_type().is_dir() {
                info!("directory {}", path.display());
                report.directories += 1;
            } else if filename.is_empty() || matches_basename(path, &filename) {
                report.files += 1;
                files.push(path.to_path_buf());
            }
        }
    }
    files
}

/// Check files (in parallel unless `sequential`) and merge the results in input order.
///
/// Returns whether any file could not be read or written.
fn check_files<W: Write>(
    files: &[PathBuf],
    checker: &Checker<'_>,
    report: &mut Report,
    sequential: bool,
    out: &mut W,
) -> Result<bool> {
    let io_errors = AtomicUsize::new(0);
    let check = |path: &PathBuf| {
        let result = check_file(path, checker);
        if matches!(result, Err(CheckError::Read { .. } | CheckError::Write { .. })) {
            io_errors.fetch_add(1, Ordering::Relaxed);
        }
        result
    };
    let results: Vec<std::result::Result<Option<FileReport>, CheckError>> = if sequential {
        files.iter().map(check).collect()
    } else {
        files.par_iter().map(check).collect()
    };

    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(Some(file)) => {
                report.add_file(&path.display().to_string(), &file, out)?;
            }
            Ok(None) => {}
            Err(err) => {
                if err.is_syntax() {
                    report.syntax_errors += 1;
                }
                out.flush()?;
                eprintln!("{err}");
            }
        }
    }
    Ok(io_errors.load(Ordering::Relaxed) > 0)
}
