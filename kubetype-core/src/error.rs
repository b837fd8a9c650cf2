use std::fmt;

use thiserror::Error;

use crate::{declaration::TypeRef, gvk::GroupVersion, package::PackagePath};

/// Possible errors found while scanning, validating or emitting generated types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A marked type has neither its own nor a package default group version
    #[error("no group version specified for type {ty}")]
    MissingGroupVersion {
        /// The marked type
        ty: TypeRef,
    },

    /// A group version string is not of the shape `group/version`
    #[error("invalid group version '{value}' specified for {origin}")]
    InvalidGroupVersion {
        /// Type or package declaring the group version
        origin: String,
        /// The raw value
        value: String,
    },

    /// A group version string names a version but no group
    #[error("group not specified in group version '{value}' for {origin}")]
    EmptyGroup {
        /// Type or package declaring the group version
        origin: String,
        /// The raw value
        value: String,
    },

    /// A `kubeType` directive without a name
    #[error("empty kubeType name specified for type {ty}")]
    EmptyKubeTypeName {
        /// The marked type
        ty: TypeRef,
    },

    /// A non repeatable directive was given more than once
    #[error("directive '{key}' specified more than once for {origin}")]
    ConflictingDirective {
        /// Type or package declaring the directive
        origin: String,
        /// The repeated directive key
        key: String,
    },

    /// A source field shares its name with a field every generated type carries
    #[error("field '{field}' of type {ty} collides with a generated field")]
    ReservedFieldName {
        /// The marked type
        ty: TypeRef,
        /// The colliding field
        field: String,
    },

    /// A `package` override that is not a valid relative package path
    #[error("invalid package '{value}' specified for type {ty}")]
    InvalidPackagePath {
        /// The marked type
        ty: TypeRef,
        /// The raw value
        value: String,
    },

    /// The same generated type name is produced by more than one source type
    #[error("duplicate kube type {name} in package {package}, duplicated by: {}", join(.sources))]
    DuplicateKubeType {
        /// Target package
        package: PackagePath,
        /// Generated type name
        name: String,
        /// Every source type producing the name, in discovery order
        sources: Vec<TypeRef>,
    },

    /// More than one group version is generated into the same package
    #[error("overlapping packages for group versions {}, all generated into {package}", join(.groups))]
    OverlappingPackageGroup {
        /// The shared target package
        package: PackagePath,
        /// Every group version targeting the package, in discovery order
        groups: Vec<GroupVersion>,
    },

    /// Generated source could not be assembled
    #[error("failed to emit {origin}: {message}")]
    Emit {
        /// Type or package being emitted
        origin: String,
        /// What went wrong
        message: String,
    },
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Every error collected during one generation run, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Errors(Vec<Error>);

impl Errors {
    /// Wrap collected errors, `None` when nothing was collected
    pub fn from_vec(errors: Vec<Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// The collected errors
    pub fn errors(&self) -> &[Error] {
        &self.0
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, an `Errors` holds at least one error
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred while generating kube types", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

impl IntoIterator for Errors {
    type IntoIter = std::vec::IntoIter<Error>;
    type Item = Error;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
