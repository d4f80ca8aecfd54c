//! Build and clean drivers.
//!
//! Both drivers take a [`ConversionPlan`] and act on it one unit at a time:
//!
//! - [`build`] creates each unit's output directory and runs the compiler
//!   on units whose artifact is stale (see [`unit_needs_rebuild`]).
//! - [`clean`] deletes every artifact the plan could have produced,
//!   regardless of staleness.
//!
//! ## Failure Policy
//!
//! A compile failure either aborts the batch ([`FailurePolicy::Abort`], the
//! default) or is recorded while the remaining units are still attempted
//! ([`FailurePolicy::KeepGoing`]). Either way the caller gets the failures
//! back: directly as the error, or in [`BuildReport::failures`].
//!
//! ## Progress
//!
//! Pass a `Sender` to receive a [`BuildEvent`] per category and per unit.
//! The CLI drains it on a printer thread through
//! [`format_build_event`](crate::output::format_build_event).

use crate::category::CategoryKind;
use crate::compiler::{CompileError, CompileJob, SchemaCompiler};
use crate::freshness::unit_needs_rebuild;
use crate::plan::{ConversionPlan, ConversionUnit};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to compile {input}: {source}")]
    Compile {
        input: PathBuf,
        #[source]
        source: CompileError,
    },
    #[error("{failed} of {total} units failed to compile")]
    Failures { failed: usize, total: usize },
}

/// What to do when one unit fails to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure.
    #[default]
    Abort,
    /// Attempt every unit and report all failures at the end.
    KeepGoing,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Passed to the compiler as `-I` include paths.
    pub include_dirs: Vec<PathBuf>,
    pub policy: FailurePolicy,
    /// Compile every unit, stale or not.
    pub force: bool,
}

/// Outcome of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitStatus {
    Compiled,
    UpToDate,
    Failed(String),
}

/// Progress events sent during a build.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    CategoryStarted {
        category: CategoryKind,
        unit_count: usize,
    },
    UnitFinished {
        /// 1-based position within the category.
        index: usize,
        input: PathBuf,
        output: PathBuf,
        status: UnitStatus,
    },
}

/// Counts for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub compiled: u32,
    pub up_to_date: u32,
    pub failed: u32,
}

impl BuildStats {
    pub fn total(&self) -> u32 {
        self.compiled + self.up_to_date + self.failed
    }
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed > 0 {
            write!(
                f,
                "{} compiled, {} up to date, {} failed ({} total)",
                self.compiled,
                self.up_to_date,
                self.failed,
                self.total()
            )
        } else if self.up_to_date > 0 {
            write!(
                f,
                "{} compiled, {} up to date ({} total)",
                self.compiled,
                self.up_to_date,
                self.total()
            )
        } else {
            write!(f, "{} compiled", self.compiled)
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub stats: BuildStats,
    /// Inputs that failed under [`FailurePolicy::KeepGoing`].
    pub failures: Vec<(PathBuf, CompileError)>,
}

impl BuildReport {
    /// Turn recorded failures into an error.
    pub fn check(&self) -> Result<(), BuildError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(BuildError::Failures {
                failed: self.failures.len(),
                total: self.stats.total() as usize,
            })
        }
    }
}

/// Compile the stale units of `plan`.
pub fn build(
    plan: &ConversionPlan,
    compiler: &impl SchemaCompiler,
    options: &BuildOptions,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let send = |event: BuildEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is watching.
            let _ = tx.send(event);
        }
    };

    let mut report = BuildReport::default();

    for group in plan.units().chunk_by(|a, b| a.category.kind == b.category.kind) {
        send(BuildEvent::CategoryStarted {
            category: group[0].category.kind,
            unit_count: group.len(),
        });

        for (i, unit) in group.iter().enumerate() {
            fs::create_dir_all(unit.output_dir())?;

            let status = if options.force || unit_needs_rebuild(unit) {
                match compiler.compile(&compile_job(unit, options)) {
                    Ok(()) => {
                        report.stats.compiled += 1;
                        UnitStatus::Compiled
                    }
                    Err(err) => {
                        report.stats.failed += 1;
                        let status = UnitStatus::Failed(err.to_string());
                        if options.policy == FailurePolicy::Abort {
                            send(finished(i, unit, status));
                            return Err(BuildError::Compile {
                                input: unit.input.clone(),
                                source: err,
                            });
                        }
                        report.failures.push((unit.input.clone(), err));
                        status
                    }
                }
            } else {
                report.stats.up_to_date += 1;
                UnitStatus::UpToDate
            };

            send(finished(i, unit, status));
        }
    }

    Ok(report)
}

fn compile_job(unit: &ConversionUnit, options: &BuildOptions) -> CompileJob {
    CompileJob {
        input: unit.input.clone(),
        schema: unit.schema.clone(),
        out_dir: unit.output_dir().to_path_buf(),
        include_dirs: options.include_dirs.clone(),
    }
}

fn finished(i: usize, unit: &ConversionUnit, status: UnitStatus) -> BuildEvent {
    BuildEvent::UnitFinished {
        index: i + 1,
        input: unit.input.clone(),
        output: unit.output.clone(),
        status,
    }
}

/// Result of a clean run.
#[derive(Debug, Default, PartialEq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    /// Planned outputs that didn't exist.
    pub absent: usize,
}

/// Delete every output in `plan` that exists on disk.
pub fn clean(plan: &ConversionPlan) -> io::Result<CleanReport> {
    let mut report = CleanReport::default();
    for output in plan.outputs() {
        if output.is_file() {
            fs::remove_file(output)?;
            report.removed.push(output.to_path_buf());
        } else {
            report.absent += 1;
        }
    }
    Ok(report)
}
