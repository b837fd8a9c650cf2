//! Annotation driven kube type generation.
//!
//! Source structs marked with a `+kubetype-gen` doc comment are turned into kubernetes
//! style resource types: a renamed copy of the struct, its list type, and the registration
//! boilerplate needed to use it as a first class resource.
//!
//! ```rust
//! use kubetype_core::{FieldShape, Generator, GeneratorConfig, SourceDeclaration, SourcePackage};
//!
//! let package = SourcePackage::new("types").with_declaration(
//!     SourceDeclaration::new("types", "Gateway")
//!         .with_comments([" +kubetype-gen", " +kubetype-gen:groupVersion=networking.istio.io/v1"])
//!         .with_field(FieldShape::new("servers", "Vec<String>")),
//! );
//! let generated = Generator::new(GeneratorConfig::default()).generate(&[package]).unwrap();
//! assert_eq!(generated[0].package.to_string(), "networking/v1");
//! assert!(generated[0].contents.contains("pub struct Gateway {"));
//! ```
//!
//! A run is all-or-nothing: every problem found in any declaration, plus every
//! conflict between declarations, is reported together and nothing is emitted.
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod collector;
pub use collector::{collect, MarkedDeclaration, RawDirective};

pub mod config;
pub use config::GeneratorConfig;

pub mod declaration;
pub use declaration::{FieldShape, SourceDeclaration, SourcePackage, TypeRef};

pub mod directive;
pub use directive::{package_defaults, parse_declaration, Directive, PackageDefaults};

pub mod emit;
pub use emit::{emit_package, GeneratedPackage};

mod error;
pub use error::{Error, Errors};

pub mod gvk;
pub use gvk::{GroupVersion, ParseGroupVersionError};

pub mod kube_type;
pub use kube_type::{Tag, TagOverrides, TypeConfig};

pub mod package;
pub use package::{PackageNaming, PackagePath};

pub mod registry;
pub use registry::{Registry, ValidatedRegistry};

/// Convient alias for `Result<T, Errors>`
pub type Result<T, E = Errors> = std::result::Result<T, E>;

/// Runs the scan, validate, emit pipeline over a set of source packages.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator with the given options
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Collect and resolve every marked declaration into a [`Registry`].
    ///
    /// Errors of individual packages and declarations are returned alongside the
    /// registry; they never stop the scan of other declarations.
    pub fn scan(&self, packages: &[SourcePackage]) -> (Registry, Vec<Error>) {
        let mut registry = Registry::new();
        let mut errors = Vec::new();
        let mut types = 0;
        for package in packages {
            tracing::debug!(package = %package.path, "scanning package");
            let defaults = match package_defaults(package) {
                Ok(defaults) => defaults,
                Err(errs) => {
                    errors.extend(errs);
                    PackageDefaults::default()
                }
            };
            for marked in collect(package) {
                match parse_declaration(&marked, &defaults, &self.config) {
                    Ok(configs) => {
                        types += configs.len();
                        registry.extend(configs);
                    }
                    Err(errs) => errors.extend(errs),
                }
            }
        }
        tracing::info!(
            packages = packages.len(),
            types,
            errors = errors.len(),
            "finished scanning input packages"
        );
        (registry, errors)
    }

    /// Generate one module per target package.
    ///
    /// Conflict detection only runs once every package has been scanned, and no
    /// output is produced unless the whole run is free of errors.
    pub fn generate(&self, packages: &[SourcePackage]) -> Result<Vec<GeneratedPackage>> {
        let (registry, mut errors) = self.scan(packages);
        let validated = match registry.validate() {
            Ok(validated) => Some(validated),
            Err(conflicts) => {
                errors.extend(conflicts);
                None
            }
        };
        if let Some(errors) = Errors::from_vec(errors) {
            return Err(errors);
        }
        let Some(validated) = validated else {
            return Ok(Vec::new());
        };

        let mut generated = Vec::new();
        let mut errors = Vec::new();
        for types in validated.packages() {
            match emit_package(&types, &self.config) {
                Ok(package) => generated.push(package),
                Err(err) => errors.push(err),
            }
        }
        match Errors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(generated),
        }
    }
}
