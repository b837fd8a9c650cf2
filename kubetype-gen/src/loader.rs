//! Loads annotated Rust source trees into [`SourcePackage`]s.
use std::{
    fs,
    path::{Path, PathBuf},
};

use kubetype_core::{collector::is_marked, FieldShape, SourceDeclaration, SourcePackage};
use quote::ToTokens;
use syn::{Attribute, Expr, ExprLit, Fields, Item, ItemStruct, Lit, Meta};
use thiserror::Error;
use walkdir::WalkDir;

/// Failures while reading the input tree.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Input root does not exist or is not a directory
    #[error("input {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Directory traversal failed
    #[error("failed to walk {}: {source}", .path.display())]
    Walk {
        /// Root being walked
        path: PathBuf,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },

    /// A source file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying io error
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid Rust
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying syn error
        #[source]
        source: syn::Error,
    },
}

/// Reads every `.rs` file below a root directory.
///
/// Each file is one package. `a/b.rs` is package `a/b`, `a/mod.rs` is package `a`,
/// and a `lib.rs` or `main.rs` directly under the root is the root package.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    root: PathBuf,
    exclude: Option<PathBuf>,
}

impl SourceLoader {
    /// Load sources below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: None,
        }
    }

    /// Skip everything below `dir`, usually the output directory
    #[must_use]
    pub fn exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude = Some(dir.into());
        self
    }

    /// Walk the tree in file name order and parse every package
    pub fn load(&self) -> Result<Vec<SourcePackage>, LoadError> {
        if !self.root.is_dir() {
            return Err(LoadError::NotADirectory(self.root.clone()));
        }
        let root = canonical(&self.root);
        let exclude = self.exclude.as_deref().map(canonical);

        let mut packages = Vec::new();
        let walker = WalkDir::new(&root).sort_by_file_name().into_iter().filter_entry(|entry| {
            let skip = exclude.as_ref().is_some_and(|dir| entry.path().starts_with(dir));
            if skip && entry.file_type().is_dir() {
                tracing::warn!(path = %entry.path().display(), "skipping output directory inside the input tree");
            }
            !skip
        });
        for entry in walker {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: root.clone(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let Some(package) = package_path(&root, path) else {
                continue;
            };
            packages.push(load_file(path, package)?);
        }
        tracing::debug!(root = %root.display(), packages = packages.len(), "loaded source packages");
        Ok(packages)
    }
}

/// Canonical form of `path`, which need not exist yet.
///
/// Relative paths are taken from the working directory. The deepest existing
/// ancestor is canonicalized and the missing rest appended to it.
fn canonical(path: &Path) -> PathBuf {
    if let Ok(path) = fs::canonicalize(path) {
        return path;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    while let Some(parent) = current.parent() {
        missing.extend(current.file_name());
        current = parent;
        if let Ok(existing) = fs::canonicalize(current) {
            return missing.iter().rev().fold(existing, |acc, name| acc.join(name));
        }
    }
    absolute
}

/// Package path of a source file relative to `root`
pub fn package_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    match segments.last().map(String::as_str) {
        Some("mod") => {
            segments.pop();
        }
        Some("lib" | "main") if segments.len() == 1 => {
            segments.pop();
        }
        _ => {}
    }
    Some(segments.join("/"))
}

/// Parse one source file as the package `package`
pub fn load_file(path: &Path, package: String) -> Result<SourcePackage, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(&text, package).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse Rust source text as the package `package`
pub fn parse_source(text: &str, package: String) -> syn::Result<SourcePackage> {
    let file = syn::parse_file(text)?;
    let mut source = SourcePackage::new(package).with_comments(doc_lines(&file.attrs));
    for item in &file.items {
        let Item::Struct(item) = item else {
            continue;
        };
        if let Some(declaration) = declaration(&source.path, item) {
            source.declarations.push(declaration);
        }
    }
    Ok(source)
}

fn declaration(package: &str, item: &ItemStruct) -> Option<SourceDeclaration> {
    let comments = doc_lines(&item.attrs);
    let name = item.ident.to_string();
    if !item.generics.params.is_empty() {
        if is_marked(&comments) {
            tracing::warn!(ty = %name, package, "generic structs are not supported, skipping");
        }
        return None;
    }
    let mut declaration = SourceDeclaration::new(package, name).with_comments(comments);
    match &item.fields {
        Fields::Named(named) => {
            for field in &named.named {
                let Some(ident) = &field.ident else { continue };
                let mut shape = FieldShape::new(ident.to_string(), field.ty.to_token_stream().to_string());
                shape.comments = doc_lines(&field.attrs);
                shape.tag = serde_args(&field.attrs);
                declaration.fields.push(shape);
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => {
            if is_marked(&declaration.comments) {
                tracing::warn!(ty = %declaration.type_ref(), "tuple structs are not supported, skipping");
            }
            return None;
        }
    }
    Some(declaration)
}

/// Doc comment lines of `attrs`, verbatim
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(ExprLit { lit: Lit::Str(doc), .. }) = &nv.value {
                lines.extend(doc.value().split('\n').map(str::to_string));
            }
        }
    }
    lines
}

/// Arguments of every `#[serde(..)]` attribute of a field, comma joined
fn serde_args(attrs: &[Attribute]) -> Option<String> {
    let args: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .filter_map(|attr| match &attr.meta {
            Meta::List(list) if !list.tokens.is_empty() => Some(list.tokens.to_string()),
            _ => None,
        })
        .collect();
    (!args.is_empty()).then(|| args.join(", "))
}
