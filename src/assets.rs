//! Copying raw assets alongside compiled artifacts.
//!
//! Audio data and other files that need no conversion are mirrored from a
//! source directory into the build tree. A file is copied when its mirror is
//! missing or older, using the same rule as compiled artifacts
//! ([`needs_rebuild`]). Copies keep the source modification time, so a
//! second run copies nothing.

use crate::freshness::{modified, needs_rebuild};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of a copy run.
#[derive(Debug, Default, PartialEq)]
pub struct CopyReport {
    /// Destination paths written, in walk order.
    pub copied: Vec<PathBuf>,
    pub up_to_date: usize,
}

/// Mirror every file under `source_dir` into `target_dir`.
///
/// Does nothing when `source_dir` doesn't exist or when both paths resolve
/// to the same directory.
pub fn copy_assets(source_dir: &Path, target_dir: &Path) -> io::Result<CopyReport> {
    let mut report = CopyReport::default();
    if !source_dir.is_dir() || same_dir(source_dir, target_dir) {
        return Ok(report);
    }

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let target = target_dir.join(relative);

        if !needs_rebuild(entry.path(), &target) {
            report.up_to_date += 1;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        if let Some(mtime) = modified(entry.path()) {
            fs::File::options()
                .write(true)
                .open(&target)?
                .set_modified(mtime)?;
        }
        report.copied.push(target);
    }
    Ok(report)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
