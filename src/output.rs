//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Units are listed under their category, each led by a positional index and
//! its input path. Paths are shown relative to the project root (inputs) or
//! the build root (outputs) so lines stay short; anything outside those
//! roots is printed as-is.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! engine_config (1 file)
//!     001 pc.config.json → pc.config.amconfig
//!         Schema: /sdk/schemas/engine_config_definition.bfbs
//! sounds (2 files)
//!     001 sounds/a.json → sounds/a.amsound
//!         Schema: /sdk/schemas/sound_definition.bfbs
//!     002 sounds/b.json → sounds/b.amsound
//!         Schema: /sdk/schemas/sound_definition.bfbs
//!
//! 3 files planned
//! ```
//!
//! ## Build
//!
//! ```text
//! sounds (2 files)
//!     001 sounds/a.json → sounds/a.amsound: compiled
//!     002 sounds/b.json → sounds/b.amsound: up to date
//! ```
//!
//! ## Clean
//!
//! ```text
//! Removed sounds/a.amsound
//! Removed 1 file (1 not present)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::assets::CopyReport;
use crate::category::{AssetCategory, extension_table};
use crate::pipeline::{BuildEvent, CleanReport, UnitStatus};
use crate::plan::ConversionPlan;
use crate::schemas::SchemaReport;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root`, `/`-separated; unchanged if outside `root`.
fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        _ => path.display().to_string(),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Category header: label + file count.
///
/// ```text
/// sounds (3 files)
/// ```
fn category_header(label: &str, count: usize) -> String {
    format!("{} ({})", label, plural(count, "file"))
}

/// Unit line: index + input → output.
fn unit_line(index: usize, input: &Path, output: &Path, roots: (&Path, &Path)) -> String {
    format!(
        "{}{} {} \u{2192} {}",
        indent(1),
        format_index(index),
        display_path(input, roots.0),
        display_path(output, roots.1)
    )
}

// ============================================================================
// plan
// ============================================================================

/// Format a conversion plan grouped by category.
pub fn format_plan(plan: &ConversionPlan, input_root: &Path, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for group in plan
        .units()
        .chunk_by(|a, b| a.category.kind == b.category.kind)
    {
        lines.push(category_header(group[0].category.kind.label(), group.len()));
        for (i, unit) in group.iter().enumerate() {
            lines.push(unit_line(
                i + 1,
                &unit.input,
                &unit.output,
                (input_root, output_root),
            ));
            lines.push(format!("{}Schema: {}", indent(2), unit.schema.display()));
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("{} planned", plural(plan.len(), "file")));
    lines
}

/// Print a plan to stdout.
pub fn print_plan(plan: &ConversionPlan, input_root: &Path, output_root: &Path) {
    for line in format_plan(plan, input_root, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// resolve
// ============================================================================

/// Format where a single file would go.
///
/// ```text
/// sounds/a.json
///     Category: sounds
///     Schema: /sdk/schemas/sound_definition.bfbs
///     Output: /proj/build/sounds/a.amsound
/// ```
pub fn format_resolution(
    input: &Path,
    category: &AssetCategory,
    schema: &Path,
    output: &Path,
) -> Vec<String> {
    vec![
        input.display().to_string(),
        format!("{}Category: {}", indent(1), category.kind),
        format!("{}Schema: {}", indent(1), schema.display()),
        format!("{}Output: {}", indent(1), output.display()),
    ]
}

// ============================================================================
// build
// ============================================================================

/// Format a single build progress event as display lines.
///
/// A failed unit carries the compiler's message as indented context.
pub fn format_build_event(event: &BuildEvent, input_root: &Path, output_root: &Path) -> Vec<String> {
    match event {
        BuildEvent::CategoryStarted {
            category,
            unit_count,
        } => vec![category_header(category.label(), *unit_count)],
        BuildEvent::UnitFinished {
            index,
            input,
            output,
            status,
        } => {
            let line = unit_line(*index, input, output, (input_root, output_root));
            match status {
                UnitStatus::Compiled => vec![format!("{line}: compiled")],
                UnitStatus::UpToDate => vec![format!("{line}: up to date")],
                UnitStatus::Failed(message) => {
                    let mut lines = vec![format!("{line}: FAILED")];
                    lines.extend(
                        message
                            .lines()
                            .filter(|l| !l.trim().is_empty())
                            .map(|l| format!("{}{}", indent(2), l)),
                    );
                    lines
                }
            }
        }
    }
}

// ============================================================================
// clean
// ============================================================================

/// Format the files a clean run removed.
pub fn format_clean_report(report: &CleanReport, output_root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .removed
        .iter()
        .map(|p| format!("Removed {}", display_path(p, output_root)))
        .collect();
    let summary = format!("Removed {}", plural(report.removed.len(), "file"));
    if report.absent > 0 {
        lines.push(format!("{summary} ({} not present)", report.absent));
    } else {
        lines.push(summary);
    }
    lines
}

/// Print a clean report to stdout.
pub fn print_clean_report(report: &CleanReport, output_root: &Path) {
    for line in format_clean_report(report, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// assets / schemas
// ============================================================================

/// Format the files an asset copy wrote.
pub fn format_copy_report(report: &CopyReport, target_dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .copied
        .iter()
        .map(|p| format!("Copied {}", display_path(p, target_dir)))
        .collect();
    lines.push(format!(
        "Assets: {} copied, {} up to date",
        report.copied.len(),
        report.up_to_date
    ));
    lines
}

/// Print an asset copy report to stdout.
pub fn print_copy_report(report: &CopyReport, target_dir: &Path) {
    for line in format_copy_report(report, target_dir) {
        println!("{}", line);
    }
}

/// Format the schemas a precompile run rebuilt.
pub fn format_schema_report(report: &SchemaReport, schema_dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .compiled
        .iter()
        .map(|p| format!("Compiled {}", display_path(p, schema_dir)))
        .collect();
    lines.push(format!(
        "Schemas: {} compiled, {} up to date",
        report.compiled.len(),
        report.up_to_date
    ));
    lines
}

/// Print a schema precompile report to stdout.
pub fn print_schema_report(report: &SchemaReport, schema_dir: &Path) {
    for line in format_schema_report(report, schema_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// extensions
// ============================================================================

/// Format the category → artifact extension table, columns aligned.
///
/// ```text
/// engine_config      .amconfig
/// buses              .ambus
/// ```
pub fn format_extension_table() -> Vec<String> {
    let table = extension_table();
    let width = table
        .iter()
        .map(|(kind, _)| kind.label().len())
        .max()
        .unwrap_or(0);
    table
        .iter()
        .map(|(kind, ext)| format!("{:<width$}  .{}", kind.label(), ext))
        .collect()
}

/// Print the extension table to stdout.
pub fn print_extension_table() {
    for line in format_extension_table() {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
