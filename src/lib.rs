//! pep8check - Style checker and fixer for Python source code
//!
//! Checks Python source against the PEP 8 conventions, one token pass per
//! file, and optionally rewrites what it can fix.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod process;
pub mod report;
pub mod rules;
pub mod selftest;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::{CodeFilter, Config};
pub use error::{CheckError, Result, TokenizeError};
pub use process::{check_file, Checker, FileReport, Violation};
pub use report::{Report, ReportOptions};
pub use rules::Registry;
