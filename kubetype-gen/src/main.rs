//! The `kubetype-gen` command line tool.
use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use kubetype_core::{PackageNaming, PackagePath};
use kubetype_gen::{run, Error, RunOptions, Settings};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Generate kube resource types from annotated Rust structs
#[derive(Parser, Debug)]
#[command(name = "kubetype-gen", version, about)]
struct App {
    /// Root of the annotated source tree
    #[arg(long, short)]
    input: PathBuf,

    /// Directory generated packages are written to
    #[arg(long, short)]
    output: PathBuf,

    /// YAML settings file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Package every derived target package is nested under
    #[arg(long)]
    base_package: Option<PackagePath>,

    /// How API groups map to package paths
    #[arg(long, value_enum)]
    naming: Option<Naming>,

    /// File whose contents are prepended to every generated file
    #[arg(long)]
    boilerplate: Option<PathBuf>,

    /// Run every check without writing any files
    #[arg(long)]
    verify_only: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Naming {
    GroupPrefix,
    ReverseDomain,
}

impl From<Naming> for PackageNaming {
    fn from(naming: Naming) -> Self {
        match naming {
            Naming::GroupPrefix => PackageNaming::GroupPrefix,
            Naming::ReverseDomain => PackageNaming::ReverseDomain,
        }
    }
}

impl App {
    fn settings(&self) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => Settings::from_file(path).context("loading settings")?,
            None => Settings::default(),
        };
        Ok(file.merge(Settings {
            base_package: self.base_package.clone(),
            naming: self.naming.map(Into::into),
            boilerplate_file: self.boilerplate.clone(),
            source_module_root: None,
        }))
    }

    fn run(&self) -> anyhow::Result<()> {
        let config = self.settings()?.into_config()?;
        let options = RunOptions::new(&self.input, &self.output).verify_only(self.verify_only);
        match run(&options, config) {
            Ok(written) => {
                tracing::info!(files = written.len(), "generation finished");
                Ok(())
            }
            Err(Error::Generate(errors)) => {
                for err in errors.errors() {
                    tracing::error!("{err}");
                }
                anyhow::bail!("{} error(s) occurred while scanning input, see previous output for details", errors.len())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "kubetype_gen=info,kubetype_core=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = App::parse();
    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
