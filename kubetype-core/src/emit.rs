//! Renders validated types into Rust source, one module per target package.
use std::collections::BTreeMap;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{parse::Parser, punctuated::Punctuated, Meta, Token};

use crate::{
    collector::is_generator_line,
    config::GeneratorConfig,
    error::Error,
    gvk::GroupVersion,
    kube_type::TypeConfig,
    package::PackagePath,
    registry::PackageTypes,
};

/// Tag marking a generated type as cluster scoped
pub const NON_NAMESPACED_TAG: &str = "genclient:nonNamespaced";

/// Fields every generated type declares ahead of the copied source fields
pub const RESERVED_FIELDS: &[&str] = &["api_version", "kind", "metadata"];

const GENERATED_MARKER: &str = "// Code generated by kubetype-gen. DO NOT EDIT.";

/// The rendered module of one target package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPackage {
    /// Target package
    pub package: PackagePath,
    /// Group version of every type in the module
    pub group_version: GroupVersion,
    /// Formatted module source
    pub contents: String,
}

/// Render every type of one package into a formatted module.
pub fn emit_package(types: &PackageTypes<'_>, config: &GeneratorConfig) -> Result<GeneratedPackage, Error> {
    let tokens = package_tokens(types, config)?;
    let file: syn::File = syn::parse2(tokens).map_err(|err| Error::Emit {
        origin: format!("package {}", types.package),
        message: err.to_string(),
    })?;

    let mut contents = String::new();
    if let Some(header) = &config.boilerplate {
        contents.push_str(header.trim_end());
        contents.push_str("\n\n");
    }
    contents.push_str(GENERATED_MARKER);
    contents.push_str("\n\n");
    contents.push_str(&prettyplease::unparse(&file));

    tracing::debug!(package = %types.package, types = types.types.len(), "emitted package");
    Ok(GeneratedPackage {
        package: types.package.clone(),
        group_version: types.group_version.clone(),
        contents,
    })
}

pub(crate) fn package_tokens(types: &PackageTypes<'_>, config: &GeneratorConfig) -> Result<TokenStream, Error> {
    let origin = format!("package {}", types.package);
    let GroupVersion { group, version } = types.group_version;
    let api_version = types.group_version.api_version();
    let group_name_tag = format!(" +groupName={group}");

    let mut source_packages: Vec<&str> = Vec::new();
    for ty in &types.types {
        if !source_packages.contains(&ty.source.package.as_str()) {
            source_packages.push(&ty.source.package);
        }
    }
    let imports = source_packages
        .into_iter()
        .map(|pkg| source_module(&config.source_module_root, pkg, &origin))
        .collect::<Result<Vec<_>, _>>()?;

    let kinds = types.types.iter().flat_map(|ty| [ty.name.clone(), ty.list_name()]);
    let kube_types = types
        .types
        .iter()
        .map(|ty| kube_type_tokens(ty))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        #![doc = " Package has auto-generated kube type wrappers for raw types."]
        #![doc = ""]
        #![doc = #group_name_tag]

        #(
            #[allow(unused_imports)]
            use #imports::*;
        )*

        /// API group of the types in this module
        pub const GROUP_NAME: &str = #group;
        /// API version of the types in this module
        pub const VERSION: &str = #version;
        /// `apiVersion` of the types in this module
        pub const API_VERSION: &str = #api_version;
        /// Kinds registered by this module, each followed by its list kind
        pub const KNOWN_KINDS: &[&str] = &[#(#kinds),*];

        /// Qualify a resource name with the group of this module
        pub fn resource(resource: &str) -> String {
            format!("{}.{}", resource, GROUP_NAME)
        }

        #(#kube_types)*
    })
}

fn source_module(root: &str, package: &str, origin: &str) -> Result<syn::Path, Error> {
    let path = std::iter::once(root)
        .chain(package.split('/').filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join("::");
    syn::parse_str(&path).map_err(|err| Error::Emit {
        origin: origin.to_string(),
        message: format!("source module {path}: {err}"),
    })
}

/// Generate the aliased type, its list type and their registration impls.
pub(crate) fn kube_type_tokens(config: &TypeConfig) -> Result<TokenStream, Error> {
    let origin = config.to_string();
    let emit_err = |what: &str, err: syn::Error| Error::Emit {
        origin: origin.clone(),
        message: format!("{what}: {err}"),
    };
    let source = &config.source;

    // Merge overrides last: later tags win, tags keyed by a field name replace its rename
    let mut field_tags: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    let mut type_tags: Vec<String> = Vec::new();
    let mut namespaced = true;
    for tag in config.tags() {
        if source.fields.iter().any(|f| f.name == tag.key) {
            field_tags.insert(&tag.key, tag.value.as_deref());
        } else {
            if tag.key == NON_NAMESPACED_TAG {
                namespaced = false;
            }
            type_tags.push(format!(" +{tag}"));
        }
    }

    let mut docs = doc_lines(&source.comments);
    if !type_tags.is_empty() {
        if !docs.is_empty() {
            docs.push(String::new());
        }
        docs.extend(type_tags);
    }

    let ident: Ident = syn::parse_str(&config.name).map_err(|err| emit_err("type name", err))?;
    let list_ident = format_ident!("{}List", ident);
    let mut fields = Vec::with_capacity(source.fields.len());
    for field in &source.fields {
        let name: Ident = syn::parse_str(&field.name).map_err(|err| emit_err("field name", err))?;
        let ty: syn::Type = syn::parse_str(&field.ty).map_err(|err| emit_err("field type", err))?;
        let field_docs = &field.comments;
        let args = serde_args(field.tag.as_deref(), field_tags.get(field.name.as_str()).copied())
            .map_err(|err| emit_err("field serde attributes", err))?;
        let serde_attr = (!args.is_empty()).then(|| quote! { #[serde(#args)] });
        fields.push(quote! {
            #(#[doc = #field_docs])*
            #serde_attr
            pub #name: #ty,
        });
    }

    let GroupVersion { group, version } = &config.group_version;
    let api_version = config.group_version.api_version();
    let kind = &config.name;
    let list_kind = config.list_name();
    let plural = to_plural(&kind.to_ascii_lowercase());
    let list_doc = format!(" {list_kind} is a collection of {}.", to_plural(kind));
    let scope = if namespaced {
        quote! { ::k8s_openapi::NamespaceResourceScope }
    } else {
        quote! { ::k8s_openapi::ClusterResourceScope }
    };

    // 1. The aliased root object, a field-for-field copy of the source
    let root_obj = quote! {
        #(#[doc = #docs])*
        #[derive(Clone, Debug, ::serde::Serialize, ::serde::Deserialize)]
        pub struct #ident {
            #[serde(rename = "apiVersion")]
            pub api_version: String,
            pub kind: String,
            #[serde(default)]
            pub metadata: ::k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
            #(#fields)*
        }
    };

    // 2. Resource identity
    let impl_resource = quote! {
        impl ::k8s_openapi::Resource for #ident {
            const API_VERSION: &'static str = #api_version;
            const GROUP: &'static str = #group;
            const KIND: &'static str = #kind;
            const VERSION: &'static str = #version;
            const URL_PATH_SEGMENT: &'static str = #plural;
            type Scope = #scope;
        }

        impl ::k8s_openapi::ListableResource for #ident {
            const LIST_KIND: &'static str = #list_kind;
        }
    };

    // 3. Object metadata access
    let impl_metadata = quote! {
        impl ::k8s_openapi::Metadata for #ident {
            type Ty = ::k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

            fn metadata(&self) -> &Self::Ty {
                &self.metadata
            }

            fn metadata_mut(&mut self) -> &mut Self::Ty {
                &mut self.metadata
            }
        }
    };

    // 4. The list type
    let list_obj = quote! {
        #[doc = #list_doc]
        #[derive(Clone, Debug, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct #list_ident {
            pub api_version: String,
            pub kind: String,
            #[serde(default)]
            pub metadata: ::k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta,
            pub items: Vec<#ident>,
        }
    };

    Ok(quote! {
        #root_obj
        #impl_resource
        #impl_metadata
        #list_obj
    })
}

/// Serde arguments of a copied field.
///
/// `tag` holds the source arguments verbatim. An override replaces only their
/// `rename`, and an override without value drops it.
fn serde_args(tag: Option<&str>, rename: Option<Option<&str>>) -> syn::Result<Punctuated<Meta, Token![,]>> {
    let mut args = match tag {
        Some(tag) => Punctuated::<Meta, Token![,]>::parse_terminated.parse_str(tag)?,
        None => Punctuated::new(),
    };
    if let Some(rename) = rename {
        args = args.into_iter().filter(|meta| !meta.path().is_ident("rename")).collect();
        if let Some(value) = rename {
            args.push(syn::parse_quote!(rename = #value));
        }
    }
    Ok(args)
}

/// Source doc lines without generator directives or surrounding blank lines
fn doc_lines(comments: &[String]) -> Vec<String> {
    let lines: Vec<&String> = comments.iter().filter(|l| !is_generator_line(l)).collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].iter().map(|l| l.to_string()).collect(),
        _ => Vec::new(),
    }
}

// Simple pluralizer for lowercased kinds.
fn to_plural(word: &str) -> String {
    // Words ending in s, x, z, ch, sh will be pluralized with -es (eg. foxes).
    if word.ends_with('s') || word.ends_with('x') || word.ends_with('z') || word.ends_with("ch") || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    // Words ending in y that are preceded by a consonant will be pluralized by
    // replacing y with -ies (eg. puppies).
    if let Some(stem) = word.strip_suffix('y') {
        if let Some(c) = stem.chars().last() {
            if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                return format!("{stem}ies");
            }
        }
    }

    // All other words will have "s" added to the end (eg. days).
    format!("{word}s")
}
