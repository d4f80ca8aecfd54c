//! Path resolution: input path → category, output path, and schema.
//!
//! The output path mirrors the input's position under the project root:
//!
//! ```text
//! project/sounds/ambience/wind.json  →  build/sounds/ambience/wind.amsound
//! project/buses.json                 →  build/buses.ambus
//! ```
//!
//! Both rely on the input and the root sharing a prefix, so paths coming from
//! the command line go through [`absolute_path`] first.

use crate::category::{AssetCategory, FALLBACK, categories};
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("{path} is not under the input root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("{0} has no file name")]
    NoFileName(PathBuf),
}

/// Classify a path relative to the project root.
///
/// Walks the registry in order and returns the first matching category, or
/// [`FALLBACK`] when nothing matches.
pub fn classify(relative: &Path) -> &'static AssetCategory {
    categories()
        .iter()
        .find(|category| category.matches(relative))
        .unwrap_or(&FALLBACK)
}

/// Classify an absolute path by first making it relative to `root`.
pub fn classify_under(path: &Path, root: &Path) -> Result<&'static AssetCategory, ResolveError> {
    let relative = relative_to(path, root)?;
    Ok(classify(relative))
}

/// Compute the artifact path for `input`.
///
/// The `input_root` prefix is replaced by `output_root` and the extension
/// by the category's. Inputs outside `input_root` are rejected rather than
/// mapped somewhere outside the output tree.
pub fn resolve_output_path(
    input: &Path,
    input_root: &Path,
    output_root: &Path,
    category: &AssetCategory,
) -> Result<PathBuf, ResolveError> {
    let relative = relative_to(input, input_root)?;
    if relative.file_name().is_none() {
        return Err(ResolveError::NoFileName(input.to_path_buf()));
    }
    Ok(output_root
        .join(relative)
        .with_extension(category.output_extension))
}

/// Find the schema for `category` in `schema_dirs`.
///
/// Returns the first `<dir>/<schema_id>.<extension>` that exists. When none
/// does, the bare file name is returned and the compiler gets to resolve it
/// through its own include paths; a missing schema surfaces as a compile
/// error, not here.
pub fn resolve_schema_path(
    category: &AssetCategory,
    schema_dirs: &[PathBuf],
    extension: &str,
) -> PathBuf {
    let file_name = format!("{}.{}", category.schema_id, extension);
    schema_dirs
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Absolute, symlink-free form of `path`, which need not exist.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged, so `link/new.json` under a symlinked `link` still
/// lands under the canonical project root.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut missing: Vec<&OsStr> = Vec::new();
    loop {
        if let Ok(real) = existing.canonicalize() {
            return Ok(missing.iter().rev().fold(real, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            // `..` or the filesystem root: nothing left to canonicalize.
            _ => return Ok(absolute.clone()),
        }
    }
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Result<&'a Path, ResolveError> {
    path.strip_prefix(root)
        .map_err(|_| ResolveError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{CategoryKind, by_kind};
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // classify
    // =========================================================================

    #[test]
    fn classify_each_directory_category() {
        let cases = [
            ("soundbanks/init.json", CategoryKind::SoundBanks),
            ("collections/footsteps.json", CategoryKind::Collections),
            ("sounds/ambience/wind.json", CategoryKind::Sounds),
            ("events/play_music.json", CategoryKind::Events),
            ("attenuators/default.json", CategoryKind::Attenuations),
            ("switches/surface.json", CategoryKind::Switches),
            ("switch_containers/steps.json", CategoryKind::SwitchContainers),
            ("rtpc/speed.json", CategoryKind::Rtpcs),
            ("effects/reverb.json", CategoryKind::Effects),
            ("environments/cave.json", CategoryKind::Environments),
        ];
        for (path, expected) in cases {
            assert_eq!(classify(Path::new(path)).kind, expected, "{path}");
        }
    }

    #[test]
    fn classify_root_suffix_files() {
        assert_eq!(
            classify(Path::new("pc.config.json")).kind,
            CategoryKind::EngineConfig
        );
        assert_eq!(classify(Path::new("buses.json")).kind, CategoryKind::Buses);
    }

    #[test]
    fn classify_suffix_wins_over_directory() {
        assert_eq!(
            classify(Path::new("sounds/debug.config.json")).kind,
            CategoryKind::EngineConfig
        );
    }

    #[test]
    fn classify_unmatched_is_fallback() {
        assert_eq!(classify(Path::new("readme.json")).kind, CategoryKind::Generic);
        assert_eq!(
            classify(Path::new("misc/notes.json")).kind,
            CategoryKind::Generic
        );
    }

    #[test]
    fn classify_under_strips_root() {
        let category =
            classify_under(Path::new("/home/sounds/proj/buses.json"), Path::new("/home/sounds/proj"))
                .unwrap();
        assert_eq!(category.kind, CategoryKind::Buses);
    }

    #[test]
    fn classify_under_rejects_foreign_path() {
        let result = classify_under(Path::new("/elsewhere/buses.json"), Path::new("/proj"));
        assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
    }

    // =========================================================================
    // resolve_output_path
    // =========================================================================

    #[test]
    fn buses_at_root_resolve_to_ambus() {
        let input = Path::new("/proj/buses.json");
        let category = classify_under(input, Path::new("/proj")).unwrap();
        let out =
            resolve_output_path(input, Path::new("/proj"), Path::new("/out"), category).unwrap();
        assert_eq!(out, PathBuf::from("/out/buses.ambus"));
    }

    #[test]
    fn nested_input_keeps_relative_layout() {
        let out = resolve_output_path(
            Path::new("/proj/sounds/ambience/wind.json"),
            Path::new("/proj"),
            Path::new("/build"),
            by_kind(CategoryKind::Sounds),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/build/sounds/ambience/wind.amsound"));
    }

    #[test]
    fn output_path_is_deterministic_and_contained() {
        let category = by_kind(CategoryKind::Events);
        let args = (
            Path::new("/proj/events/a.json"),
            Path::new("/proj"),
            Path::new("/out"),
        );
        let first = resolve_output_path(args.0, args.1, args.2, category).unwrap();
        let second = resolve_output_path(args.0, args.1, args.2, category).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("/out"));
        assert_eq!(first.extension().unwrap(), "amevent");
    }

    #[test]
    fn only_the_last_extension_is_replaced() {
        let out = resolve_output_path(
            Path::new("/proj/pc.config.json"),
            Path::new("/proj"),
            Path::new("/out"),
            by_kind(CategoryKind::EngineConfig),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/pc.config.amconfig"));
    }

    #[test]
    fn root_prefix_is_matched_by_component() {
        // "/proj-old" starts with the string "/proj" but is not under it.
        let result = resolve_output_path(
            Path::new("/proj-old/sounds/a.json"),
            Path::new("/proj"),
            Path::new("/out"),
            by_kind(CategoryKind::Sounds),
        );
        assert!(matches!(result, Err(ResolveError::OutsideRoot { .. })));
    }

    #[test]
    fn root_itself_has_no_file_name() {
        let result = resolve_output_path(
            Path::new("/proj"),
            Path::new("/proj"),
            Path::new("/out"),
            &FALLBACK,
        );
        assert!(matches!(result, Err(ResolveError::NoFileName(_))));
    }

    // =========================================================================
    // resolve_schema_path
    // =========================================================================

    #[test]
    fn schema_found_in_first_matching_dir() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(b.join("sound_definition.bfbs"), "").unwrap();

        let schema = resolve_schema_path(
            by_kind(CategoryKind::Sounds),
            &[a.clone(), b.clone()],
            "bfbs",
        );
        assert_eq!(schema, b.join("sound_definition.bfbs"));

        fs::write(a.join("sound_definition.bfbs"), "").unwrap();
        let schema = resolve_schema_path(by_kind(CategoryKind::Sounds), &[a.clone(), b], "bfbs");
        assert_eq!(schema, a.join("sound_definition.bfbs"));
    }

    // =========================================================================
    // absolute_path
    // =========================================================================

    #[test]
    fn absolute_path_canonicalizes_existing_paths() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("proj");
        fs::create_dir_all(dir.join("sounds")).unwrap();
        let path = absolute_path(&dir.join("sounds/../sounds")).unwrap();
        assert_eq!(path, dir.join("sounds").canonicalize().unwrap());
    }

    #[test]
    fn absolute_path_keeps_missing_tail() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        let path = absolute_path(&tmp.path().join("sounds/new/wind.json")).unwrap();
        assert_eq!(path, root.join("sounds/new/wind.json"));
    }

    #[cfg(unix)]
    #[test]
    fn missing_file_under_symlinked_root_stays_inside_root() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        let link = tmp.path().join("link");
        fs::create_dir_all(real.join("events")).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let root = absolute_path(&link).unwrap();
        let input = absolute_path(&link.join("events/not_yet.json")).unwrap();
        assert_eq!(root, real.canonicalize().unwrap());
        assert_eq!(input, root.join("events/not_yet.json"));
        assert_eq!(
            classify_under(&input, &root).unwrap().kind,
            CategoryKind::Events
        );
    }

    #[test]
    fn schema_not_found_falls_back_to_bare_name() {
        let tmp = TempDir::new().unwrap();
        let schema = resolve_schema_path(
            by_kind(CategoryKind::Events),
            &[tmp.path().to_path_buf()],
            "fbs",
        );
        assert_eq!(schema, PathBuf::from("event_definition.fbs"));
    }
}
