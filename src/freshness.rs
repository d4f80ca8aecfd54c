//! Mtime-based staleness checks.
//!
//! An artifact is stale when it is missing or older than any of its inputs.
//! A compiled asset has two inputs: its source description and the schema it
//! was compiled with, so touching a schema invalidates every artifact of that
//! category.
//!
//! Every call stats the files again. Nothing is memoized across calls.

use crate::plan::ConversionUnit;
use std::path::Path;
use std::time::SystemTime;

/// Modification time of `path`, or `None` if it can't be read.
pub fn modified(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Whether `target` must be regenerated from `source`.
///
/// True when `target` is not an existing file, or when `source` is strictly
/// newer. Equal timestamps count as fresh. An unreadable source (e.g. a
/// schema left as a bare name for the compiler to find) also answers true:
/// the compiler runs and reports the actual problem.
pub fn needs_rebuild(source: &Path, target: &Path) -> bool {
    if !target.is_file() {
        return true;
    }
    match (modified(source), modified(target)) {
        (Some(source_time), Some(target_time)) => source_time > target_time,
        _ => true,
    }
}

/// Whether a conversion unit's output is stale against its input or schema.
pub fn unit_needs_rebuild(unit: &ConversionUnit) -> bool {
    needs_rebuild(&unit.input, &unit.output) || needs_rebuild(&unit.schema, &unit.output)
}
