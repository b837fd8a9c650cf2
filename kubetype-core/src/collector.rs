//! Finds declarations carrying the `+kubetype-gen` marker.
use std::sync::Arc;

use crate::declaration::{SourceDeclaration, SourcePackage};

/// The base marker identifying types that need kube types generated
pub const ENABLED_TAG: &str = "kubetype-gen";

/// A raw `+kubetype-gen:<key>[=<value>]` directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirective {
    /// Key with the marker prefix removed, e.g. `groupVersion` or `Type4:tag`
    pub key: String,
    /// Everything after the first `=`, if present
    pub value: Option<String>,
}

/// A declaration carrying the base marker, paired with its directive lines.
#[derive(Debug, Clone)]
pub struct MarkedDeclaration {
    /// The marked declaration
    pub declaration: Arc<SourceDeclaration>,
    /// Directive lines in comment order
    pub directives: Vec<RawDirective>,
}

/// Split a comment line into a `+key[=value]` tag.
///
/// Lines that do not start with `+` after trimming are ordinary documentation.
fn parse_tag(line: &str) -> Option<(&str, Option<&str>)> {
    let tag = line.trim().strip_prefix('+')?;
    Some(match tag.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (tag.trim(), None),
    })
}

pub(crate) fn comment_tags(lines: &[String]) -> impl Iterator<Item = (&str, Option<&str>)> {
    lines.iter().filter_map(|line| parse_tag(line))
}

/// Whether a comment line is a `kubetype-gen` marker or directive
pub(crate) fn is_generator_line(line: &str) -> bool {
    parse_tag(line).is_some_and(|(key, _)| {
        key == ENABLED_TAG || key.strip_prefix(ENABLED_TAG).is_some_and(|rest| rest.starts_with(':'))
    })
}

/// Directive lines in `lines`, in order, with the marker prefix removed
pub fn directives(lines: &[String]) -> Vec<RawDirective> {
    let prefix = format!("{ENABLED_TAG}:");
    comment_tags(lines)
        .filter_map(|(key, value)| {
            let key = key.strip_prefix(&prefix)?;
            Some(RawDirective {
                key: key.to_string(),
                value: value.map(str::to_string),
            })
        })
        .collect()
}

/// Whether the comment lines carry the base marker
pub fn is_marked(lines: &[String]) -> bool {
    comment_tags(lines).any(|(key, _)| key == ENABLED_TAG)
}

/// Return the marked declarations of a package, in declaration order.
///
/// Declarations without the base marker are skipped silently.
pub fn collect(package: &SourcePackage) -> Vec<MarkedDeclaration> {
    package
        .declarations
        .iter()
        .filter(|decl| is_marked(&decl.comments))
        .map(|decl| {
            tracing::debug!(ty = %decl.type_ref(), "found marked type");
            MarkedDeclaration {
                declaration: Arc::new(decl.clone()),
                directives: directives(&decl.comments),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::FieldShape;

    fn decl(name: &str, comments: &[&str]) -> SourceDeclaration {
        SourceDeclaration::new("types", name)
            .with_comments(comments.iter().copied())
            .with_field(FieldShape::new("field", "String"))
    }

    #[test]
    fn skips_unmarked_declarations() {
        let pkg = SourcePackage::new("defaults")
            .with_declaration(decl("NotGenerated", &[" NotGenerated is for test"]))
            .with_declaration(decl("Defaulted", &[" Defaulted is for test", " +kubetype-gen"]));
        let marked = collect(&pkg);
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].declaration.name, "Defaulted");
        assert!(marked[0].directives.is_empty());
    }

    #[test]
    fn marker_is_an_exact_case_sensitive_token() {
        for line in [" +Kubetype-gen", " +kubetype-genx", " kubetype-gen", " +kubetype-gen:groupVersion=g/v"] {
            assert!(!is_marked(&[line.to_string()]), "{line}");
        }
        assert!(is_marked(&["  +kubetype-gen  ".to_string()]));
    }

    #[test]
    fn directives_may_surround_the_doc_text() {
        let d = decl("SecondCommentsKubeType", &[
            " +kubetype-gen:groupVersion=group/version",
            "",
            " SecondCommentsKubeType is for test",
            " +kubetype-gen",
            " +kubetype-gen:Type4:tag=sometag=somevalue",
            " +kubetype-gen:kubeType",
        ]);
        let pkg = SourcePackage::new("types").with_declaration(d);
        let marked = collect(&pkg);
        assert_eq!(marked[0].directives, vec![
            RawDirective {
                key: "groupVersion".into(),
                value: Some("group/version".into()),
            },
            RawDirective {
                key: "Type4:tag".into(),
                value: Some("sometag=somevalue".into()),
            },
            RawDirective {
                key: "kubeType".into(),
                value: None,
            },
        ]);
    }

    #[test]
    fn recognizes_generator_lines() {
        assert!(is_generator_line(" +kubetype-gen"));
        assert!(is_generator_line(" +kubetype-gen:kubeType=Foo"));
        assert!(!is_generator_line(" +genclient"));
        assert!(!is_generator_line(" plain docs"));
    }
}
