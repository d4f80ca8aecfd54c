//! # Amplitude Build
//!
//! Compiles the JSON description files of an audio project into the binary
//! assets the runtime loads. The project tree is the data source: where a
//! file lives decides what it is, which schema compiles it, and where its
//! artifact goes.
//!
//! # Architecture: Plan, Then Act
//!
//! ```text
//! 1. Plan    project/  →  ConversionPlan   (discover, classify, resolve paths)
//! 2. Filter  plan      →  stale units      (mtime of input and schema vs output)
//! 3. Act     units     →  build/           (run flatc, or delete on clean)
//! ```
//!
//! Planning only reads the filesystem. The same plan drives both `build`
//! (filtered to stale units) and `clean` (every output it names), so the two
//! can never disagree about which files belong to the pipeline.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`category`] | Ordered registry of asset categories: marker, schema, artifact extension |
//! | [`resolve`] | Classifies a path and derives its artifact and schema paths |
//! | [`freshness`] | Mtime staleness checks for artifacts against inputs and schemas |
//! | [`plan`] | Discovers description files and builds the ordered conversion plan |
//! | [`compiler`] | `SchemaCompiler` trait and the `flatc` process implementation |
//! | [`pipeline`] | Build and clean drivers, progress events, failure policy |
//! | [`assets`] | Mirrors raw asset files into the build tree |
//! | [`schemas`] | Precompiles `.fbs` schemas into `.bfbs` |
//! | [`config`] | `amplitude.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Location Decides Category
//!
//! Description files carry no type tag the pipeline can rely on without
//! parsing them, so the category comes from the path: `*.config.json` and
//! `buses.json` / `*.buses.json` in the project root, everything else from
//! its top-level directory (`sounds/`, `events/`, ...). Classification walks a fixed table
//! and the first match wins, which makes the rules easy to read in one place
//! ([`category::CATEGORIES`]).
//!
//! ## Schemas Are Inputs Too
//!
//! An artifact is rebuilt when its source file **or** its schema is newer.
//! Editing a schema therefore recompiles every asset of that category on the
//! next build, with no dependency graph to maintain.
//!
//! ## The Compiler Is a Seam
//!
//! The pipeline never spawns processes directly; it hands jobs to a
//! [`compiler::SchemaCompiler`]. Production uses [`compiler::Flatc`], tests
//! use a recording mock, and the core modules stay testable without `flatc`
//! installed.

pub mod assets;
pub mod category;
pub mod compiler;
pub mod config;
pub mod freshness;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod resolve;
pub mod schemas;

#[cfg(test)]
pub(crate) mod test_helpers;
