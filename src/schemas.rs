//! Precompiling text schemas into binary schemas.
//!
//! The compiler reads `.bfbs` binary schemas fastest, so a project usually
//! ships its `.fbs` sources once through [`compile_schemas`] and then plans
//! against the output directory. Each `X.fbs` becomes `<out_dir>/X.bfbs`,
//! rebuilt only when the source is newer. The source directory is passed
//! as an include path so schemas can `include` each other.

use crate::compiler::{CompileError, SchemaCompiler, SchemaJob};
use crate::freshness::needs_rebuild;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "fbs";
pub const BINARY_EXTENSION: &str = "bfbs";

#[derive(Debug, Default, PartialEq)]
pub struct SchemaReport {
    /// Schema sources that were compiled, in name order.
    pub compiled: Vec<PathBuf>,
    pub up_to_date: usize,
}

/// Text schema files directly inside `dir`, sorted by path.
pub fn schema_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .map(|e| e == SOURCE_EXTENSION)
                .unwrap_or(false)
        {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Binary schema path `source` compiles to inside `out_dir`.
pub fn binary_schema_path(source: &Path, out_dir: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    Some(out_dir.join(stem).with_extension(BINARY_EXTENSION))
}

/// Compile every stale schema source in `dir` into `out_dir`.
pub fn compile_schemas(
    dir: &Path,
    out_dir: &Path,
    compiler: &impl SchemaCompiler,
    force: bool,
) -> Result<SchemaReport, CompileError> {
    let mut report = SchemaReport::default();
    let sources = schema_sources(dir)?;
    if sources.is_empty() {
        return Ok(report);
    }
    fs::create_dir_all(out_dir)?;

    for source in sources {
        let stale = match binary_schema_path(&source, out_dir) {
            Some(target) => needs_rebuild(&source, &target),
            None => true,
        };
        if !force && !stale {
            report.up_to_date += 1;
            continue;
        }
        compiler.compile_schema(&SchemaJob {
            schema: source.clone(),
            out_dir: out_dir.to_path_buf(),
            include_dirs: vec![dir.to_path_buf()],
        })?;
        report.compiled.push(source);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tests::{MockCompiler, RecordedJob};
    use crate::test_helpers::{set_age, touch};
    use tempfile::TempDir;

    fn schema_dir(tmp: &TempDir) -> PathBuf {
        let dir = tmp.path().join("schemas");
        touch(&dir.join("sound_definition.fbs"));
        touch(&dir.join("buses_definition.fbs"));
        touch(&dir.join("notes.txt"));
        touch(&dir.join("nested/inner.fbs"));
        dir
    }

    #[test]
    fn sources_are_top_level_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let dir = schema_dir(&tmp);
        assert_eq!(
            schema_sources(&dir).unwrap(),
            vec![
                dir.join("buses_definition.fbs"),
                dir.join("sound_definition.fbs"),
            ]
        );
    }

    #[test]
    fn missing_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(schema_sources(&tmp.path().join("absent")).is_err());
    }

    #[test]
    fn binary_path_swaps_extension() {
        assert_eq!(
            binary_schema_path(Path::new("/s/sound_definition.fbs"), Path::new("/out")),
            Some(PathBuf::from("/out/sound_definition.bfbs"))
        );
    }

    #[test]
    fn compiles_every_source_first_time() {
        let tmp = TempDir::new().unwrap();
        let dir = schema_dir(&tmp);
        let out = tmp.path().join("out");
        let compiler = MockCompiler::new();

        let report = compile_schemas(&dir, &out, &compiler, false).unwrap();

        assert_eq!(report.compiled.len(), 2);
        assert!(out.is_dir());
        assert_eq!(
            compiler.get_jobs()[0],
            RecordedJob::Schema(SchemaJob {
                schema: dir.join("buses_definition.fbs"),
                out_dir: out.clone(),
                include_dirs: vec![dir.clone()],
            })
        );
    }

    #[test]
    fn skips_up_to_date_binaries() {
        let tmp = TempDir::new().unwrap();
        let dir = schema_dir(&tmp);
        let out = tmp.path().join("out");
        set_age(&dir.join("buses_definition.fbs"), 500);
        set_age(&dir.join("sound_definition.fbs"), 10);
        touch(&out.join("buses_definition.bfbs"));
        touch(&out.join("sound_definition.bfbs"));
        set_age(&out.join("buses_definition.bfbs"), 100);
        set_age(&out.join("sound_definition.bfbs"), 100);

        let report = compile_schemas(&dir, &out, &MockCompiler::new(), false).unwrap();

        assert_eq!(report.compiled, vec![dir.join("sound_definition.fbs")]);
        assert_eq!(report.up_to_date, 1);
    }

    #[test]
    fn force_recompiles_everything() {
        let tmp = TempDir::new().unwrap();
        let dir = schema_dir(&tmp);
        let out = tmp.path().join("out");
        for name in ["buses_definition", "sound_definition"] {
            set_age(&dir.join(format!("{name}.fbs")), 500);
            touch(&out.join(format!("{name}.bfbs")));
            set_age(&out.join(format!("{name}.bfbs")), 10);
        }

        let report = compile_schemas(&dir, &out, &MockCompiler::new(), true).unwrap();
        assert_eq!(report.compiled.len(), 2);
        assert_eq!(report.up_to_date, 0);
    }

    #[test]
    fn empty_dir_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("schemas");
        fs::create_dir_all(&dir).unwrap();
        let out = tmp.path().join("out");

        let report = compile_schemas(&dir, &out, &MockCompiler::new(), false).unwrap();
        assert_eq!(report, SchemaReport::default());
        assert!(!out.exists());
    }
}
