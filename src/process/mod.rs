//! File checking pipeline.
//!
//! [`Checker`] runs the registered rules over one file's source in a single
//! pass over its tokens:
//!
//! - physical rules see every raw line as the tokens reach it
//! - logical rules see every statement once its `NEWLINE` arrives
//! - when fixing, each rule's fix is applied before the next rule runs and
//!   the rewritten file is assembled by [`fixer`]
//!
//! [`check_file`] wraps this for files on disk.

pub mod checker;
pub mod fixer;
pub mod pipeline;

pub use checker::{Checker, FileReport, FixNotice, Violation};
pub use pipeline::{check_file, fixed_path};
