//! Shared test utilities for the amplitude-build test suite.
//!
//! Builds throwaway projects in temp directories and pins file modification
//! times so staleness tests don't depend on how fast the filesystem is.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = sample_project();
//! let config = PlanConfig::new(tmp.path().join("project"), tmp.path().join("build"));
//! let plan = build_plan(&config).unwrap();
//!
//! set_age(&plan.units()[0].input, 500);
//! assert_eq!(input_names(&plan, &config.input_root)[0], "pc.config.json");
//! ```

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::category::{CATEGORIES, CategoryKind};
use crate::plan::ConversionPlan;

// =========================================================================
// Fixture setup
// =========================================================================

/// Files of the sample project, relative to `<tmp>/project`.
pub const SAMPLE_FILES: &[&str] = &[
    "pc.config.json",
    "buses.json",
    "soundbanks/init.json",
    "collections/footsteps.json",
    "sounds/footstep_02.json",
    "sounds/footstep_01.json",
    "sounds/ambience/wind.json",
    "events/play_footstep.json",
    "attenuators/default.json",
    "switches/surface.json",
    "switch_containers/steps.json",
    "rtpc/speed.json",
    "effects/reverb.json",
    "environments/cave.json",
];

/// Create `<tmp>/project` populated with one or more files per category.
///
/// Tests get an isolated copy they can mutate freely. Files are written out
/// of order on purpose so discovery has to sort them.
pub fn sample_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("project");
    for file in SAMPLE_FILES {
        touch(&root.join(file));
    }
    tmp
}

/// Write an empty schema file for every registry category into `dir`.
pub fn write_schemas(dir: &Path, extension: &str) {
    for category in CATEGORIES {
        touch(&dir.join(format!("{}.{}", category.schema_id, extension)));
    }
}

/// Create `path` (and its parents) as an empty file if it doesn't exist.
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    if !path.exists() {
        fs::write(path, "{}").unwrap();
    }
}

// =========================================================================
// Modification time control
// =========================================================================

/// A fixed instant tests measure ages from.
fn reference_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// Set the mtime of `path` to `seconds` before the reference instant.
///
/// Bigger ages are older: `set_age(a, 100)` then `set_age(b, 10)` makes `b`
/// newer than `a`.
pub fn set_age(path: &Path, seconds: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(reference_time() - Duration::from_secs(seconds))
        .unwrap();
}

// =========================================================================
// Plan extractors
// =========================================================================

/// Input paths relative to `root`, `/`-separated, in plan order.
pub fn input_names(plan: &ConversionPlan, root: &Path) -> Vec<String> {
    plan.iter()
        .map(|unit| {
            unit.input
                .strip_prefix(root)
                .unwrap_or_else(|_| {
                    panic!("{} is not under {}", unit.input.display(), root.display())
                })
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

/// Category of every unit, in plan order.
pub fn plan_kinds(plan: &ConversionPlan) -> Vec<CategoryKind> {
    plan.iter().map(|unit| unit.category.kind).collect()
}
