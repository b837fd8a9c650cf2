//! Writes generated packages below an output root.
use std::{
    fs,
    path::{Path, PathBuf},
};

use kubetype_core::{GeneratedPackage, PackagePath};
use thiserror::Error;

/// File name of every generated module
pub const MODULE_FILE: &str = "mod.rs";

/// Failures while writing generated modules.
#[derive(Error, Debug)]
#[error("failed to write {}: {source}", .path.display())]
pub struct WriteError {
    /// Path that could not be created or written
    pub path: PathBuf,
    /// Underlying io error
    #[source]
    pub source: std::io::Error,
}

/// Location of the module generated for `package` below `root`
pub fn module_file(root: &Path, package: &PackagePath) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(package.segments());
    path.join(MODULE_FILE)
}

/// Write every package to `<root>/<package>/mod.rs`, creating directories as needed.
///
/// Returns the written files in package order.
pub fn write_packages(root: &Path, packages: &[GeneratedPackage]) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = Vec::with_capacity(packages.len());
    for package in packages {
        let file = module_file(root, &package.package);
        if let Some(dir) = file.parent() {
            fs::create_dir_all(dir).map_err(|source| WriteError {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&file, &package.contents).map_err(|source| WriteError {
            path: file.clone(),
            source,
        })?;
        tracing::info!(file = %file.display(), group_version = %package.group_version, "wrote package");
        written.push(file);
    }
    Ok(written)
}
