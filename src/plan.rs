//! Conversion planning.
//!
//! Walks a project once per category and pairs every discovered description
//! file with its schema and artifact path. The resulting [`ConversionPlan`]
//! is the single work list both drivers consume: the build driver compiles
//! the units [`ConversionPlan::filter_stale`] would keep, the clean driver
//! deletes every output in it.
//!
//! ## Discovery
//!
//! | Marker | Where | Which files |
//! |---|---|---|
//! | suffix (`.config.json`) | project root only | names ending with the suffix |
//! | directory (`sounds`) | `<root>/sounds/**` | files with the source extension |
//!
//! Files are sorted by path within each category so plans are reproducible.
//! Hidden files and directories (leading `.`) are ignored. Symlinked files and
//! directories are followed. An unreadable directory entry, or a dangling
//! link inside a category directory, fails planning rather than silently
//! shrinking the plan.
//!
//! ## Failure
//!
//! Planning only reads the filesystem. It fails on a missing root, on a file
//! discovered by one category but classified as another (the registry's
//! markers overlap), and on a duplicate input. A schema that can't be found
//! is not an error here; see [`resolve_schema_path`].

use crate::category::{AssetCategory, CategoryKind, Marker, categories};
use crate::freshness::unit_needs_rebuild;
use crate::resolve::{ResolveError, classify, resolve_output_path, resolve_schema_path};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Project root does not exist or is not a directory: {0}")]
    MissingRoot(PathBuf),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{path} was discovered as {discovered} but classifies as {classified}")]
    CategoryConflict {
        path: PathBuf,
        discovered: CategoryKind,
        classified: CategoryKind,
    },
    #[error("Input planned twice: {0}")]
    DuplicateInput(PathBuf),
}

/// Everything planning needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Project root holding the description files.
    pub input_root: PathBuf,
    /// Root of the artifact tree.
    pub output_root: PathBuf,
    /// Directories searched, in order, for schema files.
    pub schema_dirs: Vec<PathBuf>,
    /// Extension of description files discovered in category directories.
    pub source_extension: String,
    /// Extension of schema files (`bfbs` for binary, `fbs` for text).
    pub schema_extension: String,
}

impl PlanConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            schema_dirs: Vec::new(),
            source_extension: "json".to_string(),
            schema_extension: "bfbs".to_string(),
        }
    }

    pub fn with_schema_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.schema_dirs = dirs;
        self
    }
}

/// One input/schema/output triple ready to hand to the compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionUnit {
    #[serde(serialize_with = "serialize_category")]
    pub category: &'static AssetCategory,
    pub input: PathBuf,
    pub schema: PathBuf,
    pub output: PathBuf,
}

fn serialize_category<S: Serializer>(
    category: &&'static AssetCategory,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    category.kind.serialize(serializer)
}

impl ConversionUnit {
    /// Directory the compiler writes this unit's artifact into.
    pub fn output_dir(&self) -> &Path {
        self.output.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Ordered work list: registry order across categories, path order within.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConversionPlan {
    units: Vec<ConversionUnit>,
}

impl ConversionPlan {
    /// Build a plan from units, rejecting duplicate inputs.
    pub fn from_units(units: Vec<ConversionUnit>) -> Result<Self, PlanError> {
        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.input.as_path()) {
                return Err(PlanError::DuplicateInput(unit.input.clone()));
            }
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[ConversionUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversionUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every artifact path this plan can produce.
    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|u| u.output.as_path())
    }

    /// The units belonging to one of `kinds`, in order.
    pub fn filter_categories(&self, kinds: &[CategoryKind]) -> ConversionPlan {
        ConversionPlan {
            units: self
                .units
                .iter()
                .filter(|unit| kinds.contains(&unit.category.kind))
                .cloned()
                .collect(),
        }
    }

    /// The units whose output is stale against input or schema, in order.
    pub fn filter_stale(&self) -> ConversionPlan {
        ConversionPlan {
            units: self
                .units
                .iter()
                .filter(|unit| unit_needs_rebuild(unit))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ConversionPlan {
    type Item = &'a ConversionUnit;
    type IntoIter = std::slice::Iter<'a, ConversionUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Discover and resolve every convertible file under the project root.
pub fn build_plan(config: &PlanConfig) -> Result<ConversionPlan, PlanError> {
    if !config.input_root.is_dir() {
        return Err(PlanError::MissingRoot(config.input_root.clone()));
    }

    let mut units = Vec::new();
    for category in categories() {
        let schema =
            resolve_schema_path(category, &config.schema_dirs, &config.schema_extension);

        for input in discover(category, config)? {
            let relative = input
                .strip_prefix(&config.input_root)
                .map_err(|_| ResolveError::OutsideRoot {
                    path: input.clone(),
                    root: config.input_root.clone(),
                })?;
            let classified = classify(relative);
            if classified.kind != category.kind {
                return Err(PlanError::CategoryConflict {
                    path: input,
                    discovered: category.kind,
                    classified: classified.kind,
                });
            }

            let output =
                resolve_output_path(&input, &config.input_root, &config.output_root, category)?;
            units.push(ConversionUnit {
                category,
                input,
                schema: schema.clone(),
                output,
            });
        }
    }

    ConversionPlan::from_units(units)
}

/// Candidate files for one category, sorted by path.
///
/// Symlinks are followed, so a linked file or directory is discovered under
/// the path of the link.
fn discover(category: &AssetCategory, config: &PlanConfig) -> Result<Vec<PathBuf>, PlanError> {
    let mut files = Vec::new();
    if category.is_root_only() {
        for entry in fs::read_dir(&config.input_root)? {
            let path = entry?.path();
            let Some(name) = path.file_name() else {
                continue;
            };
            if path.is_file() && !is_hidden(&path) && category.matches(Path::new(name)) {
                files.push(path);
            }
        }
    } else if let Marker::Directory(dir) = category.marker {
        let base = config.input_root.join(dir);
        if !base.is_dir() {
            return Ok(files);
        }
        let walker = WalkDir::new(&base)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), &config.source_extension)
            {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
