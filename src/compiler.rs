//! The schema compiler seam.
//!
//! The [`SchemaCompiler`] trait defines the two jobs the pipeline hands to an
//! external compiler: turning a description file into a binary artifact, and
//! turning a text schema into a binary schema. The production implementation
//! is [`Flatc`], which spawns the `flatc` executable:
//!
//! ```text
//! flatc -o <out_dir> -I <dir>... -b <schema> <input>      # compile
//! flatc -o <out_dir> -I <dir>... -b --schema <schema>     # compile_schema
//! ```
//!
//! Finding the executable is left to the OS: [`Flatc::new`] takes whatever
//! program name or path the configuration holds.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Cannot run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error running command `{command}`. Returned {code}.\n{stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compile one description file against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileJob {
    pub input: PathBuf,
    pub schema: PathBuf,
    pub out_dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
}

impl CompileJob {
    /// Compiler arguments: `-o <out_dir> [-I <dir>]... -b <schema> <input>`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = output_and_includes(&self.out_dir, &self.include_dirs);
        args.push("-b".into());
        args.push(self.schema.clone().into_os_string());
        args.push(self.input.clone().into_os_string());
        args
    }
}

/// Compile one text schema into a binary schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaJob {
    pub schema: PathBuf,
    pub out_dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
}

impl SchemaJob {
    /// Compiler arguments: `-o <out_dir> [-I <dir>]... -b --schema <schema>`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = output_and_includes(&self.out_dir, &self.include_dirs);
        args.push("-b".into());
        args.push("--schema".into());
        args.push(self.schema.clone().into_os_string());
        args
    }
}

fn output_and_includes(out_dir: &Path, include_dirs: &[PathBuf]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-o".into(), out_dir.as_os_str().to_owned()];
    for dir in include_dirs {
        args.push("-I".into());
        args.push(dir.as_os_str().to_owned());
    }
    args
}

/// Anything that can run compile jobs.
pub trait SchemaCompiler {
    /// Compile a description file into `job.out_dir`.
    fn compile(&self, job: &CompileJob) -> Result<(), CompileError>;

    /// Compile a text schema into a binary schema in `job.out_dir`.
    fn compile_schema(&self, job: &SchemaJob) -> Result<(), CompileError>;
}

/// Runs the `flatc` executable.
#[derive(Debug, Clone)]
pub struct Flatc {
    program: PathBuf,
}

impl Flatc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), CompileError> {
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        Err(CompileError::Failed {
            command: render_command(&self.program, &args),
            code: output.status.code().unwrap_or(1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for Flatc {
    fn default() -> Self {
        Self::new("flatc")
    }
}

impl SchemaCompiler for Flatc {
    fn compile(&self, job: &CompileJob) -> Result<(), CompileError> {
        self.run(job.args())
    }

    fn compile_schema(&self, job: &SchemaJob) -> Result<(), CompileError> {
        self.run(job.args())
    }
}

/// Space-joined command line for error messages.
pub fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(|a| a.as_os_str()))
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Compiler that records jobs instead of running anything.
    /// Inputs listed in `failing` return an error.
    #[derive(Default)]
    pub struct MockCompiler {
        pub jobs: Mutex<Vec<RecordedJob>>,
        pub failing: HashSet<PathBuf>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedJob {
        Compile(CompileJob),
        Schema(SchemaJob),
    }

    impl MockCompiler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(inputs: &[&Path]) -> Self {
            Self {
                jobs: Mutex::new(Vec::new()),
                failing: inputs.iter().map(|p| p.to_path_buf()).collect(),
            }
        }

        pub fn get_jobs(&self) -> Vec<RecordedJob> {
            self.jobs.lock().unwrap().clone()
        }

        /// Inputs of recorded compile jobs, in call order.
        pub fn compiled_inputs(&self) -> Vec<PathBuf> {
            self.get_jobs()
                .into_iter()
                .filter_map(|job| match job {
                    RecordedJob::Compile(job) => Some(job.input),
                    RecordedJob::Schema(_) => None,
                })
                .collect()
        }
    }

    impl SchemaCompiler for MockCompiler {
        fn compile(&self, job: &CompileJob) -> Result<(), CompileError> {
            self.jobs
                .lock()
                .unwrap()
                .push(RecordedJob::Compile(job.clone()));
            if self.failing.contains(&job.input) {
                return Err(CompileError::Failed {
                    command: render_command(Path::new("flatc"), &job.args()),
                    code: 1,
                    stderr: "mock failure".to_string(),
                });
            }
            Ok(())
        }

        fn compile_schema(&self, job: &SchemaJob) -> Result<(), CompileError> {
            self.jobs
                .lock()
                .unwrap()
                .push(RecordedJob::Schema(job.clone()));
            Ok(())
        }
    }

    #[test]
    fn compile_args_match_invocation_shape() {
        let job = CompileJob {
            input: "/p/sounds/a.json".into(),
            schema: "/sdk/schemas/sound_definition.bfbs".into(),
            out_dir: "/b/sounds".into(),
            include_dirs: vec!["/sdk/schemas".into(), "/extra".into()],
        };
        let args: Vec<String> = job
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-o",
                "/b/sounds",
                "-I",
                "/sdk/schemas",
                "-I",
                "/extra",
                "-b",
                "/sdk/schemas/sound_definition.bfbs",
                "/p/sounds/a.json",
            ]
        );
    }

    #[test]
    fn compile_args_without_includes() {
        let job = CompileJob {
            input: "a.json".into(),
            schema: "sound_definition.bfbs".into(),
            out_dir: "out".into(),
            include_dirs: vec![],
        };
        assert_eq!(job.args().len(), 5);
    }

    #[test]
    fn schema_args_request_binary_schema() {
        let job = SchemaJob {
            schema: "schemas/sound_definition.fbs".into(),
            out_dir: "out".into(),
            include_dirs: vec!["schemas".into()],
        };
        let args: Vec<String> = job
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-o",
                "out",
                "-I",
                "schemas",
                "-b",
                "--schema",
                "schemas/sound_definition.fbs"
            ]
        );
    }

    #[test]
    fn render_command_joins_with_spaces() {
        let rendered = render_command(
            Path::new("flatc"),
            &["-o".into(), "out".into(), "a.json".into()],
        );
        assert_eq!(rendered, "flatc -o out a.json");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let flatc = Flatc::new("/definitely/not/a/real/flatc");
        let job = CompileJob {
            input: "a.json".into(),
            schema: "s.bfbs".into(),
            out_dir: "out".into(),
            include_dirs: vec![],
        };
        assert!(matches!(
            flatc.compile(&job),
            Err(CompileError::Spawn { .. })
        ));
    }

    #[test]
    fn mock_records_jobs_and_fails_on_request() {
        let compiler = MockCompiler::failing_on(&[Path::new("bad.json")]);
        let good = CompileJob {
            input: "good.json".into(),
            schema: "s.bfbs".into(),
            out_dir: "out".into(),
            include_dirs: vec![],
        };
        let bad = CompileJob {
            input: "bad.json".into(),
            ..good.clone()
        };
        assert!(compiler.compile(&good).is_ok());
        assert!(compiler.compile(&bad).is_err());
        assert_eq!(
            compiler.compiled_inputs(),
            vec![PathBuf::from("good.json"), PathBuf::from("bad.json")]
        );
    }

    #[test]
    fn default_program_is_flatc() {
        assert_eq!(Flatc::default().program(), Path::new("flatc"));
    }
}
