//! Source declarations as handed over by a source loader.
use std::fmt;

/// A source package and the type declarations found in it, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePackage {
    /// Package path relative to the input root, `/` separated
    pub path: String,
    /// Raw package level doc comment lines
    pub comments: Vec<String>,
    /// Type declarations in declaration order
    pub declarations: Vec<SourceDeclaration>,
}

impl SourcePackage {
    /// Create an empty package at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add package level comment lines
    #[must_use]
    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments.extend(comments.into_iter().map(Into::into));
        self
    }

    /// Add a declaration to this package
    #[must_use]
    pub fn with_declaration(mut self, declaration: SourceDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }
}

/// A named struct declaration with its raw comment lines and field shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeclaration {
    /// Package path of the declaring package
    pub package: String,
    /// Type name
    pub name: String,
    /// Raw comment lines attached to the declaration, verbatim
    pub comments: Vec<String>,
    /// Named fields in declaration order
    pub fields: Vec<FieldShape>,
}

impl SourceDeclaration {
    /// Create a declaration without comments or fields
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            comments: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Add comment lines
    #[must_use]
    pub fn with_comments<I, S>(mut self, comments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comments.extend(comments.into_iter().map(Into::into));
        self
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, field: FieldShape) -> Self {
        self.fields.push(field);
        self
    }

    /// Reference identifying this declaration in diagnostics
    pub fn type_ref(&self) -> TypeRef {
        TypeRef {
            package: self.package.clone(),
            name: self.name.clone(),
        }
    }
}

/// One named field of a source struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    /// Field name
    pub name: String,
    /// Field type as written in source
    pub ty: String,
    /// Arguments of the field's `#[serde(..)]` attributes as written in source,
    /// e.g. `default, rename = "hostName"`
    pub tag: Option<String>,
    /// Raw doc comment lines of the field
    pub comments: Vec<String>,
}

impl FieldShape {
    /// Create a field without tag or comments
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            tag: None,
            comments: Vec::new(),
        }
    }

    /// Set the serde arguments
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// (package, name) identity of a source declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Package path of the declaring package
    pub package: String,
    /// Type name
    pub name: String,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}
