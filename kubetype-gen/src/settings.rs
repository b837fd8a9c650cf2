//! Generator settings from a YAML file overlaid with command line flags.
use std::{
    fs,
    path::{Path, PathBuf},
};

use kubetype_core::{GeneratorConfig, PackageNaming, PackagePath};
use serde::Deserialize;
use thiserror::Error;

/// Failures while assembling the generator settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A settings or boilerplate file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying io error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid YAML for [`Settings`]
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying yaml error
        #[source]
        source: serde_yaml::Error,
    },
}

/// Every optional generator setting.
///
/// Unset values fall back to [`GeneratorConfig::default`].
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    /// Package all derived target packages are nested under
    pub base_package: Option<PackagePath>,
    /// How API groups map to package paths
    pub naming: Option<PackageNaming>,
    /// File whose contents are prepended to every generated file
    pub boilerplate_file: Option<PathBuf>,
    /// Module path source packages are imported from
    pub source_module_root: Option<String>,
}

impl Settings {
    /// Read settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = read(path)?;
        serde_yaml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `other` on top of these settings; values set in `other` win
    #[must_use]
    pub fn merge(self, other: Settings) -> Self {
        Self {
            base_package: other.base_package.or(self.base_package),
            naming: other.naming.or(self.naming),
            boilerplate_file: other.boilerplate_file.or(self.boilerplate_file),
            source_module_root: other.source_module_root.or(self.source_module_root),
        }
    }

    /// Resolve into a [`GeneratorConfig`], reading the boilerplate file if one is set
    pub fn into_config(self) -> Result<GeneratorConfig, SettingsError> {
        let mut config = GeneratorConfig::default();
        if let Some(base) = self.base_package {
            config = config.base_package(base);
        }
        if let Some(naming) = self.naming {
            config = config.naming(naming);
        }
        if let Some(path) = &self.boilerplate_file {
            config = config.boilerplate(read(path)?);
        }
        if let Some(root) = self.source_module_root {
            config.source_module_root = root;
        }
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String, SettingsError> {
    fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let file: Settings = serde_yaml::from_str("basePackage: pkg/apis\nnaming: reverse-domain\n").unwrap();
        let flags = Settings {
            naming: Some(PackageNaming::GroupPrefix),
            ..Settings::default()
        };
        let config = file.merge(flags).into_config().unwrap();
        assert_eq!(config.base_package.to_string(), "pkg/apis");
        assert_eq!(config.naming, PackageNaming::GroupPrefix);
        assert_eq!(config.source_module_root, "crate");
    }

    #[test]
    fn reads_boilerplate_file() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("boilerplate.txt");
        fs::write(&header, "// Copyright Istio Authors\n").unwrap();
        let settings = Settings {
            boilerplate_file: Some(header),
            ..Settings::default()
        };
        let config = settings.into_config().unwrap();
        assert_eq!(config.boilerplate.as_deref(), Some("// Copyright Istio Authors\n"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "basePackage: apis\nbogus: true\n").unwrap();
        assert!(matches!(Settings::from_file(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn missing_boilerplate_is_an_error() {
        let settings = Settings {
            boilerplate_file: Some("/definitely/not/here".into()),
            ..Settings::default()
        };
        assert!(matches!(settings.into_config(), Err(SettingsError::Read { .. })));
    }
}
