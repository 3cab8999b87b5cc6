//! Single-file rebuild paths and the on-disk replacement discipline.
//!
//! Both rebuild paths produce a complete byte buffer through the one
//! canonical encoder; neither ever writes a partial file.  [`write_atomic`]
//! is the only way bytes reach a destination path: full write to a
//! same-directory temp file, then an atomic rename over the target.  If
//! anything fails before the rename the destination is untouched and the
//! temp file is deleted by its own drop.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::classify::Classification;
use crate::document::{FormatError, IplFile};
use crate::text::{parse_car_line, parse_instance_line, TextParseError};

#[derive(Error, Debug)]
pub enum RebuildError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Text(#[from] TextParseError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Rebuild from user-edited text.  Stops at the first bad line; no partial
/// record list is ever encoded.  Blank lines are ignored; reported line
/// numbers are 1-based over the raw input of each section.
pub fn rebuild_from_text<'a>(
    instance_lines: impl IntoIterator<Item = &'a str>,
    car_lines: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<u8>, RebuildError> {
    let mut instances = Vec::new();
    for (idx, line) in instance_lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        instances.push(parse_instance_line(line, idx + 1)?);
    }

    let mut cars = Vec::new();
    for (idx, line) in car_lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        cars.push(parse_car_line(line, idx + 1)?);
    }

    Ok(IplFile::from_records(instances, cars).encode_compact()?)
}

/// Rebuild from the original binary, keeping every record verbatim
/// (`interior` included).  Extended layouts are refused; re-encoding them
/// would drop their unmodelled sections.
pub fn rebuild_preserving_original(original: &[u8]) -> Result<Vec<u8>, FormatError> {
    let file = IplFile::decode(original)?;
    if file.classification() == Classification::Extended {
        return Err(FormatError::ExtendedFormat);
    }
    Ok(file.encode_compact()?)
}

/// Write `bytes` to `path` all-or-nothing.
///
/// The temp file lives in the destination directory so the final rename
/// never crosses a filesystem boundary.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Sibling backup path: `<name>.bak`, overwritten without warning.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy `path` to its backup path before any destructive step.
pub fn copy_to_backup(path: &Path) -> io::Result<()> {
    fs::copy(path, backup_path(path)).map(|_| ())
}
