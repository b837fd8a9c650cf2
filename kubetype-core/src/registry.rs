//! Run wide accumulation of [`TypeConfig`]s and global conflict detection.
use std::{collections::HashMap, sync::Arc};

use crate::{error::Error, gvk::GroupVersion, kube_type::TypeConfig, package::PackagePath};

/// Every [`TypeConfig`] discovered in one generation run, in discovery order.
///
/// Indexed by (target package, type name) for conflict detection. Each config
/// occupies two names, its own and the name of its list type.
#[derive(Debug, Default)]
pub struct Registry {
    configs: Vec<TypeConfig>,
    index: HashMap<(PackagePath, String), Vec<usize>>,
    // index keys in order of first appearance
    keys: Vec<(PackagePath, String)>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolved type
    pub fn insert(&mut self, config: TypeConfig) {
        let position = self.configs.len();
        for name in [config.name.clone(), config.list_name()] {
            let key = (config.package.clone(), name);
            match self.index.get_mut(&key) {
                Some(positions) => positions.push(position),
                None => {
                    self.index.insert(key.clone(), vec![position]);
                    self.keys.push(key);
                }
            }
        }
        self.configs.push(config);
    }

    /// Check the whole registry for conflicts.
    ///
    /// Both checks always run to completion so every conflict is reported at once.
    pub fn validate(self) -> Result<ValidatedRegistry, Vec<Error>> {
        let mut errors = self.duplicate_kube_types();
        errors.extend(self.overlapping_packages());
        if errors.is_empty() {
            Ok(ValidatedRegistry { configs: self.configs })
        } else {
            Err(errors)
        }
    }

    fn duplicate_kube_types(&self) -> Vec<Error> {
        let mut errors = Vec::new();
        // two aliases sharing a name also share the list name, report that once
        let mut reported: Vec<&[usize]> = Vec::new();
        for key in &self.keys {
            let positions = self.index[key].as_slice();
            if positions.len() < 2 || reported.contains(&positions) {
                continue;
            }
            reported.push(positions);
            let mut sources: Vec<&TypeConfig> = Vec::new();
            for other in positions.iter().map(|&i| &self.configs[i]) {
                if !sources.iter().any(|s| Arc::ptr_eq(&s.source, &other.source)) {
                    sources.push(other);
                }
            }
            let (package, name) = key;
            errors.push(Error::DuplicateKubeType {
                package: package.clone(),
                name: name.clone(),
                sources: sources.iter().map(|s| s.source.type_ref()).collect(),
            });
        }
        errors
    }

    fn overlapping_packages(&self) -> Vec<Error> {
        let mut packages: Vec<(&PackagePath, Vec<&GroupVersion>)> = Vec::new();
        let mut positions: HashMap<&PackagePath, usize> = HashMap::new();
        for config in &self.configs {
            let pos = *positions.entry(&config.package).or_insert_with(|| {
                packages.push((&config.package, Vec::new()));
                packages.len() - 1
            });
            let groups = &mut packages[pos].1;
            if !groups.contains(&&config.group_version) {
                groups.push(&config.group_version);
            }
        }
        packages
            .into_iter()
            .filter(|(_, groups)| groups.len() > 1)
            .map(|(package, groups)| Error::OverlappingPackageGroup {
                package: package.clone(),
                groups: groups.into_iter().cloned().collect(),
            })
            .collect()
    }
}

impl Extend<TypeConfig> for Registry {
    fn extend<T: IntoIterator<Item = TypeConfig>>(&mut self, iter: T) {
        for config in iter {
            self.insert(config);
        }
    }
}

/// A conflict free registry, ready for emission.
#[derive(Debug)]
pub struct ValidatedRegistry {
    configs: Vec<TypeConfig>,
}

/// The types generated into one package.
#[derive(Debug)]
pub struct PackageTypes<'a> {
    /// Target package
    pub package: &'a PackagePath,
    /// The single group version of every type in the package
    pub group_version: &'a GroupVersion,
    /// Types in discovery order
    pub types: Vec<&'a TypeConfig>,
}

impl ValidatedRegistry {
    /// Types grouped by target package, packages in order of first appearance
    pub fn packages(&self) -> Vec<PackageTypes<'_>> {
        let mut packages: Vec<PackageTypes<'_>> = Vec::new();
        for config in &self.configs {
            match packages.iter_mut().find(|p| p.package == &config.package) {
                Some(pkg) => pkg.types.push(config),
                None => packages.push(PackageTypes {
                    package: &config.package,
                    group_version: &config.group_version,
                    types: vec![config],
                }),
            }
        }
        packages
    }
}
