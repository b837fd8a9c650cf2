//! Turns raw directive lines into [`TypeConfig`]s.
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    collector::{self, MarkedDeclaration, RawDirective},
    config::GeneratorConfig,
    declaration::{SourcePackage, TypeRef},
    emit::RESERVED_FIELDS,
    error::Error,
    gvk::{GroupVersion, ParseGroupVersionError},
    kube_type::{Tag, TagOverrides, TypeConfig},
    package::PackagePath,
};

const GROUP_VERSION: &str = "groupVersion";
const KUBE_TYPE: &str = "kubeType";
const PACKAGE: &str = "package";
const TAG: &str = "tag";

/// A parsed `+kubetype-gen:` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `groupVersion=<group>/<version>`
    GroupVersion(String),
    /// `kubeType=<name>`, `None` for a bare `kubeType`
    KubeType(Option<String>),
    /// `[<alias>:]package=<path>`
    Package {
        /// Alias the override is scoped to
        alias: Option<String>,
        /// Raw package path
        path: String,
    },
    /// `[<alias>:]tag=<key>[=<value>]`
    Tag {
        /// Alias the tag is scoped to
        alias: Option<String>,
        /// The tag
        tag: Tag,
    },
    /// Anything else under the marker prefix
    Unknown(RawDirective),
}

impl Directive {
    /// Classify a raw directive line
    pub fn parse(raw: &RawDirective) -> Self {
        let value = raw.value.clone();
        let (alias, key) = match raw.key.rsplit_once(':') {
            Some((alias, key)) if !alias.is_empty() && !alias.contains(':') => (Some(alias), key),
            Some(_) => return Self::Unknown(raw.clone()),
            None => (None, raw.key.as_str()),
        };
        match (alias, key, value) {
            (None, GROUP_VERSION, value) => Self::GroupVersion(value.unwrap_or_default()),
            (None, KUBE_TYPE, value) => Self::KubeType(value.filter(|v| !v.is_empty())),
            (alias, PACKAGE, value) => Self::Package {
                alias: alias.map(str::to_string),
                path: value.unwrap_or_default(),
            },
            (alias, TAG, Some(value)) if !value.is_empty() => Self::Tag {
                alias: alias.map(str::to_string),
                tag: Tag::parse(&value),
            },
            _ => Self::Unknown(raw.clone()),
        }
    }
}

/// Defaults declared in a package's own doc comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDefaults {
    /// Group version for marked types that do not declare one
    pub group_version: Option<GroupVersion>,
}

/// Read the package level defaults of `package`.
///
/// Like on a declaration, `groupVersion` may only be given once.
pub fn package_defaults(package: &SourcePackage) -> Result<PackageDefaults, Vec<Error>> {
    let origin = format!("package {}", package.path);
    let values: Vec<String> = collector::directives(&package.comments)
        .into_iter()
        .filter_map(|raw| match Directive::parse(&raw) {
            Directive::GroupVersion(value) => Some(value),
            _ => None,
        })
        .collect();
    let Some(value) = values.first() else {
        return Ok(PackageDefaults::default());
    };

    let mut errors = Vec::new();
    if values.len() > 1 {
        errors.push(Error::ConflictingDirective {
            origin: origin.clone(),
            key: GROUP_VERSION.to_string(),
        });
    }
    match parse_group_version(value, origin) {
        Ok(group_version) if errors.is_empty() => {
            tracing::debug!(package = %package.path, %group_version, "default group version for package");
            Ok(PackageDefaults {
                group_version: Some(group_version),
            })
        }
        Ok(_) => Err(errors),
        Err(err) => {
            errors.push(err);
            Err(errors)
        }
    }
}

fn parse_group_version(value: &str, origin: String) -> Result<GroupVersion, Error> {
    value.parse().map_err(|err| match err {
        ParseGroupVersionError::InvalidGroupVersion(value) => Error::InvalidGroupVersion { origin, value },
        ParseGroupVersionError::EmptyGroup(value) => Error::EmptyGroup { origin, value },
    })
}

/// Directives of one declaration, folded before validation.
#[derive(Default)]
struct Folded {
    group_version: Option<String>,
    names: Vec<String>,
    bare_kube_type: bool,
    package: Option<String>,
    scoped_packages: BTreeMap<String, String>,
    overrides: TagOverrides,
}

/// Resolve every alias requested by a marked declaration.
///
/// All problems with the declaration are returned together.
pub fn parse_declaration(
    marked: &MarkedDeclaration,
    defaults: &PackageDefaults,
    config: &GeneratorConfig,
) -> Result<Vec<TypeConfig>, Vec<Error>> {
    let decl = &marked.declaration;
    let ty = decl.type_ref();
    let mut errors = Vec::new();
    let mut folded = Folded::default();

    for raw in &marked.directives {
        match Directive::parse(raw) {
            Directive::GroupVersion(value) => {
                if folded.group_version.is_some() {
                    errors.push(conflicting(&ty, GROUP_VERSION));
                } else {
                    folded.group_version = Some(value);
                }
            }
            Directive::KubeType(Some(name)) => {
                if folded.names.contains(&name) {
                    tracing::warn!(%ty, "kubeType {name} specified more than once");
                } else {
                    folded.names.push(name);
                }
            }
            Directive::KubeType(None) => folded.bare_kube_type = true,
            Directive::Package { alias: None, path } => {
                if folded.package.is_some() {
                    errors.push(conflicting(&ty, PACKAGE));
                } else {
                    folded.package = Some(path);
                }
            }
            Directive::Package {
                alias: Some(alias),
                path,
            } => {
                if folded.scoped_packages.contains_key(&alias) {
                    errors.push(conflicting(&ty, &format!("{alias}:{PACKAGE}")));
                } else {
                    folded.scoped_packages.insert(alias, path);
                }
            }
            Directive::Tag { alias: None, tag } => folded.overrides.push(tag),
            Directive::Tag {
                alias: Some(alias),
                tag,
            } => folded.overrides.push_scoped(&alias, tag),
            Directive::Unknown(raw) => {
                tracing::warn!(%ty, key = %raw.key, "ignoring unknown kubetype-gen directive");
            }
        }
    }

    let group_version = match (&folded.group_version, &defaults.group_version) {
        (Some(value), _) => match parse_group_version(value, ty.to_string()) {
            Ok(gv) => Some(gv),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        (None, Some(default)) => Some(default.clone()),
        (None, None) => {
            errors.push(Error::MissingGroupVersion { ty: ty.clone() });
            None
        }
    };

    if folded.bare_kube_type {
        errors.push(Error::EmptyKubeTypeName { ty: ty.clone() });
    }
    for field in decl.fields.iter().filter(|f| RESERVED_FIELDS.contains(&f.name.as_str())) {
        errors.push(Error::ReservedFieldName {
            ty: ty.clone(),
            field: field.name.clone(),
        });
    }
    if folded.names.is_empty() {
        folded.names.push(decl.name.clone());
    }

    let package = folded
        .package
        .as_deref()
        .and_then(|value| parse_package(value, &ty, &mut errors));
    let scoped_packages: BTreeMap<&str, PackagePath> = folded
        .scoped_packages
        .iter()
        .filter_map(|(alias, value)| Some((alias.as_str(), parse_package(value, &ty, &mut errors)?)))
        .collect();

    let scoped = folded.scoped_packages.keys().map(String::as_str);
    for alias in scoped.chain(folded.overrides.scoped_aliases()) {
        if !folded.names.iter().any(|n| n == alias) {
            tracing::warn!(%ty, "ignoring directive scoped to unknown kubeType {alias}");
        }
    }

    let group_version = match group_version {
        Some(gv) if errors.is_empty() => gv,
        _ => return Err(errors),
    };

    let overrides = Arc::new(folded.overrides);
    let configs = folded
        .names
        .into_iter()
        .map(|name| {
            let package = scoped_packages
                .get(name.as_str())
                .or(package.as_ref())
                .cloned()
                .unwrap_or_else(|| group_version.package_path(&config.base_package, config.naming));
            TypeConfig {
                source: Arc::clone(&marked.declaration),
                group_version: group_version.clone(),
                name,
                package,
                overrides: Arc::clone(&overrides),
            }
        })
        .collect::<Vec<_>>();
    for config in &configs {
        tracing::debug!(%config, group_version = %config.group_version, "resolved kube type");
    }
    Ok(configs)
}

fn conflicting(ty: &TypeRef, key: &str) -> Error {
    Error::ConflictingDirective {
        origin: ty.to_string(),
        key: key.to_string(),
    }
}

fn parse_package(value: &str, ty: &TypeRef, errors: &mut Vec<Error>) -> Option<PackagePath> {
    match value.parse() {
        Ok(path) => Some(path),
        Err(_) => {
            errors.push(Error::InvalidPackagePath {
                ty: ty.clone(),
                value: value.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{FieldShape, SourceDeclaration};

    fn marked(name: &str, comments: &[&str]) -> MarkedDeclaration {
        let decl = SourceDeclaration::new("types", name)
            .with_comments(comments.iter().copied())
            .with_field(FieldShape::new("field", "String"));
        let pkg = SourcePackage::new("types").with_declaration(decl);
        collector::collect(&pkg).remove(0)
    }

    fn parse(name: &str, comments: &[&str]) -> Result<Vec<TypeConfig>, Vec<Error>> {
        parse_declaration(
            &marked(name, comments),
            &PackageDefaults::default(),
            &GeneratorConfig::default(),
        )
    }

    fn ty(name: &str) -> TypeRef {
        TypeRef {
            package: "types".into(),
            name: name.into(),
        }
    }

    #[test]
    fn classifies_directives() {
        let raw = |key: &str, value: Option<&str>| RawDirective {
            key: key.into(),
            value: value.map(Into::into),
        };
        assert_eq!(
            Directive::parse(&raw("groupVersion", Some("g/v"))),
            Directive::GroupVersion("g/v".into())
        );
        assert_eq!(Directive::parse(&raw("kubeType", None)), Directive::KubeType(None));
        assert_eq!(Directive::parse(&raw("kubeType", Some(""))), Directive::KubeType(None));
        assert_eq!(Directive::parse(&raw("Type4:tag", Some("a=b"))), Directive::Tag {
            alias: Some("Type4".into()),
            tag: Tag::parse("a=b"),
        });
        assert_eq!(Directive::parse(&raw("Type4:package", Some("x/y"))), Directive::Package {
            alias: Some("Type4".into()),
            path: "x/y".into(),
        });
        assert!(matches!(Directive::parse(&raw("Type4:kubeType", Some("X"))), Directive::Unknown(_)));
        assert!(matches!(Directive::parse(&raw("a:b:tag", Some("X"))), Directive::Unknown(_)));
        assert!(matches!(Directive::parse(&raw("tag", None)), Directive::Unknown(_)));
    }

    #[test]
    fn defaults_name_and_package() {
        let configs = parse("Type1", &[" +kubetype-gen", " +kubetype-gen:groupVersion=group/version"]).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "Type1");
        assert_eq!(configs[0].group_version, GroupVersion::gv("group", "version"));
        assert_eq!(configs[0].package.to_string(), "group/version");
    }

    #[test]
    fn missing_group_version() {
        let errors = parse("NoGroupVersion", &[" +kubetype-gen"]).unwrap_err();
        assert_eq!(errors, vec![Error::MissingGroupVersion { ty: ty("NoGroupVersion") }]);
    }

    #[test]
    fn invalid_group_versions() {
        let errors = parse("InvalidGroupVersion", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version/version",
        ])
        .unwrap_err();
        assert_eq!(errors, vec![Error::InvalidGroupVersion {
            origin: "types.InvalidGroupVersion".into(),
            value: "group/version/version".into(),
        }]);

        let errors = parse("EmptyGroup", &[" +kubetype-gen", " +kubetype-gen:groupVersion=groupversion"]).unwrap_err();
        assert_eq!(errors, vec![Error::EmptyGroup {
            origin: "types.EmptyGroup".into(),
            value: "groupversion".into(),
        }]);
    }

    #[test]
    fn multiple_names_share_source_and_group_version() {
        let configs = parse("MultipleNames", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version",
            " +kubetype-gen:kubeType=Type3",
            " +kubetype-gen:kubeType=Type4",
            " +kubetype-gen:Type4:tag=sometag=somevalue",
        ])
        .unwrap();
        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Type3", "Type4"]);
        assert!(Arc::ptr_eq(&configs[0].source, &configs[1].source));
        assert_eq!(configs[0].group_version, configs[1].group_version);
        assert_eq!(configs[0].tags().count(), 0);
        assert_eq!(configs[1].tags().map(ToString::to_string).collect::<Vec<_>>(), [
            "sometag=somevalue"
        ]);
    }

    #[test]
    fn repeated_name_collapses() {
        let configs = parse("Repeated", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version",
            " +kubetype-gen:kubeType=Type5",
            " +kubetype-gen:kubeType=Type5",
        ])
        .unwrap();
        assert_eq!(configs.len(), 1);
    }

    #[test]
    fn bare_kube_type_is_an_error() {
        let errors = parse("EmptyKubeType", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version",
            " +kubetype-gen:kubeType",
        ])
        .unwrap_err();
        assert_eq!(errors, vec![Error::EmptyKubeTypeName { ty: ty("EmptyKubeType") }]);
    }

    #[test]
    fn collects_every_error_of_a_declaration() {
        let errors = parse("Broken", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=groupversion",
            " +kubetype-gen:kubeType",
            " +kubetype-gen:package=../escape",
            " +kubetype-gen:package=again",
        ])
        .unwrap_err();
        assert_eq!(errors, vec![
            Error::ConflictingDirective {
                origin: "types.Broken".into(),
                key: "package".into(),
            },
            Error::EmptyGroup {
                origin: "types.Broken".into(),
                value: "groupversion".into(),
            },
            Error::EmptyKubeTypeName { ty: ty("Broken") },
            Error::InvalidPackagePath {
                ty: ty("Broken"),
                value: "../escape".into(),
            },
        ]);
    }

    #[test]
    fn package_override_changes_only_the_package() {
        let configs = parse("AllOverridden", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group2/version2",
            " +kubetype-gen:package=success/defaults/override",
        ])
        .unwrap();
        assert_eq!(configs[0].package.to_string(), "success/defaults/override");
        assert_eq!(configs[0].group_version, GroupVersion::gv("group2", "version2"));

        let errors = parse("OverriddenButInvalid", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version/version",
            " +kubetype-gen:package=success/defaults/override",
        ])
        .unwrap_err();
        assert!(matches!(errors[..], [Error::InvalidGroupVersion { .. }]));
    }

    #[test]
    fn scoped_package_applies_to_one_alias() {
        let configs = parse("Scoped", &[
            " +kubetype-gen",
            " +kubetype-gen:groupVersion=group/version",
            " +kubetype-gen:kubeType=Namespaced",
            " +kubetype-gen:kubeType=Clustered",
            " +kubetype-gen:Clustered:package=cluster/version",
            " +kubetype-gen:Clustered:tag=genclient:nonNamespaced",
        ])
        .unwrap();
        assert_eq!(configs[0].package.to_string(), "group/version");
        assert_eq!(configs[1].package.to_string(), "cluster/version");
    }

    #[test]
    fn falls_back_to_package_default() {
        let pkg = SourcePackage::new("defaults").with_comments([" +kubetype-gen:groupVersion=group/version"]);
        let defaults = package_defaults(&pkg).unwrap();
        let configs = parse_declaration(
            &marked("Defaulted", &[" +kubetype-gen"]),
            &defaults,
            &GeneratorConfig::default(),
        )
        .unwrap();
        assert_eq!(configs[0].group_version, GroupVersion::gv("group", "version"));

        let own = parse_declaration(
            &marked("Own", &[" +kubetype-gen", " +kubetype-gen:groupVersion=group2/version2"]),
            &defaults,
            &GeneratorConfig::default(),
        )
        .unwrap();
        assert_eq!(own[0].group_version, GroupVersion::gv("group2", "version2"));
    }

    #[test]
    fn invalid_package_default_names_the_package() {
        let pkg = SourcePackage::new("defaults").with_comments([" +kubetype-gen:groupVersion=v1"]);
        assert_eq!(package_defaults(&pkg).unwrap_err(), vec![Error::EmptyGroup {
            origin: "package defaults".into(),
            value: "v1".into(),
        }]);
    }

    #[test]
    fn repeated_package_default_conflicts() {
        let pkg = SourcePackage::new("defaults").with_comments([
            " +kubetype-gen:groupVersion=group/version",
            " Package docs",
            " +kubetype-gen:groupVersion=group3/version3",
        ]);
        assert_eq!(package_defaults(&pkg).unwrap_err(), vec![Error::ConflictingDirective {
            origin: "package defaults".into(),
            key: "groupVersion".into(),
        }]);
    }

    #[test]
    fn generated_field_names_are_reserved() {
        let decl = SourceDeclaration::new("types", "Widget")
            .with_comments([" +kubetype-gen", " +kubetype-gen:groupVersion=group/version"])
            .with_field(FieldShape::new("metadata", "String"))
            .with_field(FieldShape::new("size", "u32"))
            .with_field(FieldShape::new("kind", "String"));
        let pkg = SourcePackage::new("types").with_declaration(decl);
        let errors = parse_declaration(
            &collector::collect(&pkg).remove(0),
            &PackageDefaults::default(),
            &GeneratorConfig::default(),
        )
        .unwrap_err();
        assert_eq!(errors, vec![
            Error::ReservedFieldName {
                ty: ty("Widget"),
                field: "metadata".into(),
            },
            Error::ReservedFieldName {
                ty: ty("Widget"),
                field: "kind".into(),
            },
        ]);
    }
}
