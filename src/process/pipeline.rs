//! Checking files on disk
//!
//! Reads a file, runs the [`Checker`] over it and, when fixing, writes the
//! rewritten source either back to the file or next to it as `fixed_<name>`.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::checker::{Checker, FileReport};
use crate::error::CheckError;

/// Files larger than this are skipped (100 MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Where fixed output for `path` is written when not fixing in place
#[must_use]
pub fn fixed_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
    path.with_file_name(format!("fixed_{name}"))
}

/// How a file's bytes were turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Latin1,
}

/// Decode file contents; bytes that are not UTF-8 are read as Latin-1
fn decode(bytes: Vec<u8>) -> (String, Encoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, Encoding::Utf8),
        Err(err) => (
            err.into_bytes().iter().map(|&b| char::from(b)).collect(),
            Encoding::Latin1,
        ),
    }
}

/// Encode text back into the encoding it was read with
fn encode(text: &str, encoding: Encoding) -> std::io::Result<Vec<u8>> {
    match encoding {
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Latin1 => text
            .chars()
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("{c:?} cannot be written as Latin-1"),
                    )
                })
            })
            .collect(),
    }
}

/// Check one file; write the fixed source when the configuration asks for it.
///
/// Returns `Ok(None)` for files skipped because of their size.
pub fn check_file(path: &Path, checker: &Checker<'_>) -> Result<Option<FileReport>, CheckError> {
    let read_error = |source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = std::fs::metadata(path).map_err(read_error)?.len();
    if size > MAX_FILE_SIZE {
        warn!(
            "skipping {} ({} MB exceeds limit of {} MB)",
            path.display(),
            size / (1024 * 1024),
            MAX_FILE_SIZE / (1024 * 1024)
        );
        return Ok(None);
    }

    info!("checking {}", path.display());
    let (source, encoding) = decode(std::fs::read(path).map_err(read_error)?);
    let report = checker
        .check_source(&source)
        .map_err(|source| CheckError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(fixed) = &report.fixed {
        let target = if checker.config().in_place {
            path.to_path_buf()
        } else {
            fixed_path(path)
        };
        encode(fixed, encoding)
            .and_then(|bytes| std::fs::write(&target, bytes))
            .map_err(|source| CheckError::Write {
                path: target.clone(),
                source,
            })?;
    }
    Ok(Some(report))
}
