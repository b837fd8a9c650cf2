//! Command line driver for [`kubetype_core`].
//!
//! Loads an annotated source tree, runs the generator over it and writes one
//! `mod.rs` per target package below an output directory.
#![deny(missing_docs)]
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use kubetype_core::{Errors, GeneratorConfig, Generator};
use thiserror::Error;

pub mod loader;
pub use loader::{LoadError, SourceLoader};

pub mod settings;
pub use settings::{Settings, SettingsError};

pub mod writer;
pub use writer::{write_packages, WriteError};

/// Failures of a generation run.
#[derive(Error, Debug)]
pub enum Error {
    /// Settings could not be assembled
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The input tree could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The input contained invalid or conflicting declarations
    #[error(transparent)]
    Generate(#[from] Errors),

    /// Generated modules could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root of the annotated source tree
    pub input: PathBuf,
    /// Root below which generated packages are written
    pub output: PathBuf,
    /// Check the input without writing anything
    pub verify_only: bool,
}

impl RunOptions {
    /// Generate from `input` into `output`
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            verify_only: false,
        }
    }

    /// Only run the checks
    #[must_use]
    pub fn verify_only(mut self, verify_only: bool) -> Self {
        self.verify_only = verify_only;
        self
    }
}

/// Load, generate and write.
///
/// Nothing is written unless the whole input is free of errors. Returns the
/// files written, which is empty for a verify only run.
pub fn run(options: &RunOptions, config: GeneratorConfig) -> Result<Vec<PathBuf>, Error> {
    let packages = SourceLoader::new(&options.input).exclude(&options.output).load()?;
    let generated = Generator::new(config).generate(&packages)?;
    if options.verify_only {
        tracing::info!(packages = generated.len(), "verified input, nothing written");
        return Ok(Vec::new());
    }
    Ok(write_packages(Path::new(&options.output), &generated)?)
}
