use amplitude_build::category::CategoryKind;
use amplitude_build::compiler::Flatc;
use amplitude_build::config::{self, BuildConfig};
use amplitude_build::pipeline::{self, BuildOptions, FailurePolicy};
use amplitude_build::plan::{PlanConfig, build_plan};
use amplitude_build::resolve::{
    absolute_path, classify_under, resolve_output_path, resolve_schema_path,
};
use amplitude_build::{assets, output, schemas};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "amplitude-build")]
#[command(about = "Compile audio project description files into binary assets")]
#[command(long_about = "\
Compile audio project description files into binary assets

Every JSON description file in the project is classified by where it lives,
paired with its schema, and compiled with flatc into the build directory.
Files whose artifact is newer than both the file and its schema are skipped.

Project structure:

  project/
  ├── amplitude.toml               # Build config (optional)
  ├── pc.config.json               # Engine config      → build/pc.config.amconfig
  ├── buses.json                   # Buses              → build/buses.ambus
  ├── soundbanks/init.json         # Sound banks        → build/soundbanks/init.ambank
  ├── collections/                 # → .amcollection
  ├── sounds/ambience/wind.json    # Nested directories are mirrored
  ├── events/                      # → .amevent
  ├── attenuators/                 # → .amattenuation
  ├── switches/                    # → .amswitch
  ├── switch_containers/           # → .amswitchcontainer
  ├── rtpc/                        # → .amrtpc
  ├── effects/                     # → .amfx
  └── environments/                # → .amenv

Run 'amplitude-build extensions' for the full category table and
'amplitude-build gen-config' to generate a documented amplitude.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding the description files
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Build output directory [default: <project>/build]
    #[arg(long, global = true)]
    build: Option<PathBuf>,

    /// Schema compiler executable [default: flatc]
    #[arg(long, global = true)]
    flatc: Option<PathBuf>,

    /// Schema search directory, repeatable, searched in order [default: <project>/schemas]
    #[arg(long = "schema-dir", global = true)]
    schema_dirs: Vec<PathBuf>,

    /// Extra config file layered over <project>/amplitude.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile every stale description file
    Build {
        /// Keep compiling after a failure and report all failures at the end
        #[arg(long)]
        keep_going: bool,
        /// Recompile everything, ignoring timestamps
        #[arg(long)]
        force: bool,
        /// Directory copied verbatim into the build directory first
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Delete every artifact the build could have produced
    Clean,
    /// Show the conversion plan without compiling
    Plan {
        /// Only list files that need recompiling
        #[arg(long)]
        stale: bool,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
        /// Only list files of this category, repeatable (see 'extensions')
        #[arg(long = "category", value_name = "KIND")]
        categories: Vec<CategoryKind>,
    },
    /// Show category, schema and output for one file
    Resolve {
        /// Description file inside the project
        path: PathBuf,
    },
    /// Print the category → artifact extension table
    Extensions,
    /// Precompile text schemas (*.fbs) into binary schemas (*.bfbs)
    Schemas {
        /// Directory holding the .fbs sources [default: first schema directory]
        #[arg(long)]
        source: Option<PathBuf>,
        /// Where to write the .bfbs files [default: the source directory]
        #[arg(long)]
        output: Option<PathBuf>,
        /// Recompile every schema, ignoring timestamps
        #[arg(long)]
        force: bool,
    },
    /// Print a stock amplitude.toml with all options documented
    GenConfig,
}

/// Config file values with command-line overrides applied.
struct Settings {
    project: PathBuf,
    output: PathBuf,
    flatc: PathBuf,
    schema_dirs: Vec<PathBuf>,
    config: BuildConfig,
}

impl Settings {
    fn plan_config(&self) -> PlanConfig {
        let mut plan = PlanConfig::new(&self.project, &self.output)
            .with_schema_dirs(self.schema_dirs.clone());
        plan.source_extension = self.config.sources.extension.clone();
        plan.schema_extension = self.config.schemas.extension.clone();
        plan
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    if let Command::Extensions = cli.command {
        output::print_extension_table();
        return Ok(());
    }

    let settings = resolve_settings(&cli)?;

    match cli.command {
        Command::Build {
            keep_going,
            force,
            assets: assets_arg,
        } => {
            println!("==> Planning {}", settings.project.display());
            let plan = build_plan(&settings.plan_config())?;

            let assets_dir = assets_arg
                .map(|dir| absolute_path(&dir))
                .transpose()?
                .or_else(|| settings.config.assets_dir(&settings.project));
            if let Some(dir) = assets_dir {
                println!("==> Copying assets from {}", dir.display());
                let report = assets::copy_assets(&dir, &settings.output)?;
                output::print_copy_report(&report, &settings.output);
            }

            let flatc = Flatc::new(&settings.flatc);
            println!(
                "==> Compiling {} files with {} → {}",
                plan.len(),
                flatc.program().display(),
                settings.output.display()
            );
            let options = BuildOptions {
                include_dirs: settings.schema_dirs.clone(),
                policy: if keep_going || settings.config.build.keep_going {
                    FailurePolicy::KeepGoing
                } else {
                    FailurePolicy::Abort
                },
                force,
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let input_root = settings.project.clone();
            let output_root = settings.output.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event, &input_root, &output_root) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&plan, &flatc, &options, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            let report = result?;
            println!("Build: {}", report.stats);
            report.check()?;
            println!("==> Build complete: {}", settings.output.display());
        }
        Command::Clean => {
            let plan = build_plan(&settings.plan_config())?;
            println!("==> Cleaning {}", settings.output.display());
            let report = pipeline::clean(&plan)?;
            output::print_clean_report(&report, &settings.output);
        }
        Command::Plan {
            stale,
            json,
            categories,
        } => {
            let mut plan = build_plan(&settings.plan_config())?;
            if !categories.is_empty() {
                plan = plan.filter_categories(&categories);
            }
            if stale {
                plan = plan.filter_stale();
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan, &settings.project, &settings.output);
            }
        }
        Command::Resolve { path } => {
            let input = absolute_path(&path)?;
            let category = classify_under(&input, &settings.project)?;
            let schema = resolve_schema_path(
                category,
                &settings.schema_dirs,
                &settings.config.schemas.extension,
            );
            let output_path =
                resolve_output_path(&input, &settings.project, &settings.output, category)?;
            for line in output::format_resolution(&input, category, &schema, &output_path) {
                println!("{}", line);
            }
        }
        Command::Schemas {
            source,
            output: out_dir,
            force,
        } => {
            let source = match source {
                Some(dir) => absolute_path(&dir)?,
                None => settings
                    .schema_dirs
                    .first()
                    .cloned()
                    .ok_or("no schema directory configured; pass --source or --schema-dir")?,
            };
            let out_dir = match out_dir {
                Some(dir) => absolute_path(&dir)?,
                None => source.clone(),
            };
            println!(
                "==> Compiling schemas {} → {}",
                source.display(),
                out_dir.display()
            );
            let report =
                schemas::compile_schemas(&source, &out_dir, &Flatc::new(&settings.flatc), force)?;
            output::print_schema_report(&report, &source);
        }
        Command::Extensions | Command::GenConfig => {}
    }

    Ok(())
}

/// Load the layered config for the project and apply command-line flags.
fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let project = absolute_path(&cli.project)?;
    let extra = cli.config.as_deref().map(absolute_path).transpose()?;
    let config = config::load_config(&project, extra.as_deref())?;

    let output = match &cli.build {
        Some(dir) => absolute_path(dir)?,
        None => config.output_dir(&project),
    };
    let flatc = cli
        .flatc
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.compiler.program));
    let schema_dirs = if cli.schema_dirs.is_empty() {
        config.schema_dirs(&project)
    } else {
        cli.schema_dirs
            .iter()
            .map(|d| absolute_path(d))
            .collect::<Result<_, _>>()?
    };

    Ok(Settings {
        project,
        output,
        flatc,
        schema_dirs,
        config,
    })
}
