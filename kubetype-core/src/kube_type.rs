//! Resolved generation requests.
use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{declaration::SourceDeclaration, gvk::GroupVersion, package::PackagePath};

/// A `key[=value]` tag added to a generated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Tag key, e.g. `genclient:nonNamespaced` or a source field name
    pub key: String,
    /// Optional tag value
    pub value: Option<String>,
}

impl Tag {
    /// Parse `key[=value]`
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((key, value)) => Self {
                key: key.trim().to_string(),
                value: Some(value.trim().to_string()),
            },
            None => Self {
                key: raw.trim().to_string(),
                value: None,
            },
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.key, value),
            None => f.write_str(&self.key),
        }
    }
}

/// Tag overrides declared on one source type, shared by all of its aliases.
///
/// Unscoped tags apply to every alias, scoped tags only to the named alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOverrides {
    common: Vec<Tag>,
    scoped: BTreeMap<String, Vec<Tag>>,
}

impl TagOverrides {
    /// Add a tag for every alias
    pub fn push(&mut self, tag: Tag) {
        self.common.push(tag);
    }

    /// Add a tag for a single alias
    pub fn push_scoped(&mut self, alias: &str, tag: Tag) {
        self.scoped.entry(alias.to_string()).or_default().push(tag);
    }

    /// Aliases with scoped tags
    pub fn scoped_aliases(&self) -> impl Iterator<Item = &str> {
        self.scoped.keys().map(String::as_str)
    }

    /// Tags in effect for `alias`: unscoped tags first, then the alias' own
    pub fn for_alias<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.common.iter().chain(self.scoped.get(alias).into_iter().flatten())
    }
}

/// The fully resolved generation request for one output alias.
#[derive(Debug, Clone)]
pub struct TypeConfig {
    /// The originating source declaration
    pub source: Arc<SourceDeclaration>,
    /// API group and version of the generated type
    pub group_version: GroupVersion,
    /// Name of the generated type
    pub name: String,
    /// Package the type is generated into
    pub package: PackagePath,
    /// Tag overrides of the originating declaration
    pub overrides: Arc<TagOverrides>,
}

impl TypeConfig {
    /// Tags in effect for this alias
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.overrides.for_alias(&self.name)
    }

    /// Name of the generated list type
    pub fn list_name(&self) -> String {
        format!("{}List", self.name)
    }
}

impl fmt::Display for TypeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}/{}", self.source.type_ref(), self.package, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_tags_follow_common_tags() {
        let mut overrides = TagOverrides::default();
        overrides.push(Tag::parse("genclient"));
        overrides.push_scoped("Type4", Tag::parse("sometag=somevalue"));
        let type3: Vec<_> = overrides.for_alias("Type3").map(ToString::to_string).collect();
        let type4: Vec<_> = overrides.for_alias("Type4").map(ToString::to_string).collect();
        assert_eq!(type3, ["genclient"]);
        assert_eq!(type4, ["genclient", "sometag=somevalue"]);
    }

    #[test]
    fn tag_value_keeps_inner_equals() {
        let tag = Tag::parse("selector=a=b");
        assert_eq!(tag.key, "selector");
        assert_eq!(tag.value.as_deref(), Some("a=b"));
    }
}
