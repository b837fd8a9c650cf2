//! Target package paths for generated types.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failed to parse a package path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid package path '{0}'")]
pub struct ParsePackagePathError(pub String);

/// Strategy used to turn an API group into the package path of its generated types.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PackageNaming {
    /// Use the first label of the group: `networking.istio.io` becomes `networking`
    #[default]
    GroupPrefix,
    /// Nest every label of the group in reverse order: `networking.istio.io` becomes `io/istio/networking`
    ReverseDomain,
}

/// A relative, `/` separated package path.
///
/// The empty path is the output root.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PackagePath {
    segments: Vec<String>,
}

impl PackagePath {
    /// The output root
    pub fn root() -> Self {
        Self::default()
    }

    /// Append a segment, sanitized into a module safe name
    pub fn join(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(sanitize(segment));
        Self { segments }
    }

    /// Path segments in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl FromStr for PackagePath {
    type Err = ParsePackagePathError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(ParsePackagePathError(path.into()));
        }
        let segments = path
            .split('/')
            .map(|s| match s {
                "" | "." | ".." => Err(ParsePackagePathError(path.into())),
                s => Ok(s.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }
}

impl TryFrom<String> for PackagePath {
    type Error = ParsePackagePathError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        path.parse()
    }
}

impl From<PackagePath> for String {
    fn from(path: PackagePath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_override_paths() {
        let path: PackagePath = "success/defaults/override".parse().unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), ["success", "defaults", "override"]);
        assert_eq!(path.to_string(), "success/defaults/override");
    }

    #[test]
    fn rejects_empty_and_relative_segments() {
        for bad in ["", "/abs", "a//b", "a/./b", "../up", "trailing/"] {
            assert!(bad.parse::<PackagePath>().is_err(), "{bad}");
        }
    }

    #[test]
    fn join_sanitizes_segments() {
        let path = PackagePath::root().join("Istio-System").join("v1beta1");
        assert_eq!(path.to_string(), "istio_system/v1beta1");
    }

    #[test]
    fn naming_deserializes_kebab_case() {
        let naming: PackageNaming = serde_yaml::from_str("reverse-domain").unwrap();
        assert_eq!(naming, PackageNaming::ReverseDomain);
    }
}
