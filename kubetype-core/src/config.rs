//! Generator options.
use serde::{Deserialize, Serialize};

use crate::package::{PackageNaming, PackagePath};

/// Options controlling where and how kube types are generated.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Package all derived target packages are nested under
    pub base_package: PackagePath,
    /// How API groups map to package paths
    pub naming: PackageNaming,
    /// Header text prepended verbatim to every generated file
    pub boilerplate: Option<String>,
    /// Module path source packages are imported from in generated files
    pub source_module_root: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_package: PackagePath::root(),
            naming: PackageNaming::default(),
            boilerplate: None,
            source_module_root: "crate".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Nest derived target packages under `base`
    #[must_use]
    pub fn base_package(mut self, base: PackagePath) -> Self {
        self.base_package = base;
        self
    }

    /// Use `naming` to derive target packages
    #[must_use]
    pub fn naming(mut self, naming: PackageNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Prepend `header` to every generated file
    #[must_use]
    pub fn boilerplate(mut self, header: impl Into<String>) -> Self {
        self.boilerplate = Some(header.into());
        self
    }
}
