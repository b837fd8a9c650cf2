//! Group/version parsing and target package derivation.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::package::{PackageNaming, PackagePath};

/// Failed to parse a group version string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseGroupVersionError {
    /// The string is not of the shape `group/version`
    #[error("invalid group version '{0}': expected exactly one '/' separating group and version")]
    InvalidGroupVersion(String),

    /// A version was given without a group
    #[error("invalid group version '{0}': group not specified")]
    EmptyGroup(String),
}

/// Core information about a family of API Resources
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersion {
    /// API group
    pub group: String,
    /// Version
    pub version: String,
}

impl GroupVersion {
    /// Construct from explicit group and version
    pub fn gv(group_: &str, version_: &str) -> Self {
        let version = version_.to_string();
        let group = group_.to_string();
        Self { group, version }
    }

    /// Generate the apiVersion string used in a kind's yaml
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// Derive the default target package for this group version under `base`.
    ///
    /// The derivation only depends on `(group, version)` and the naming strategy,
    /// so repeated runs always land types in the same package.
    pub fn package_path(&self, base: &PackagePath, naming: PackageNaming) -> PackagePath {
        let labels: Vec<&str> = match naming {
            PackageNaming::GroupPrefix => self.group.split('.').take(1).collect(),
            PackageNaming::ReverseDomain => self.group.split('.').rev().collect(),
        };
        let mut path = base.clone();
        for label in labels {
            path = path.join(label);
        }
        path.join(&self.version)
    }
}

impl FromStr for GroupVersion {
    type Err = ParseGroupVersionError;

    fn from_str(gv: &str) -> Result<Self, Self::Err> {
        let (group, version) = match gv.rsplit_once('/') {
            Some((g, v)) => (g, v),
            None if gv.is_empty() => return Err(ParseGroupVersionError::InvalidGroupVersion(gv.into())),
            // a bare version is the core group; generated types always need a group
            None => return Err(ParseGroupVersionError::EmptyGroup(gv.into())),
        };
        if group.contains('/') || version.is_empty() {
            return Err(ParseGroupVersionError::InvalidGroupVersion(gv.into()));
        }
        if group.is_empty() {
            return Err(ParseGroupVersionError::EmptyGroup(gv.into()));
        }
        Ok(Self::gv(group, version))
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_version())
    }
}
