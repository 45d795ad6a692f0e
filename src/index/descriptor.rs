//! Public-surface descriptors.
//!
//! A descriptor is a TOML file standing in for a prebuilt archive when the
//! archive itself is not at hand:
//!
//! ```toml
//! [[type]]
//! name = "com.acme.pool.PoolSettings"
//! markers = ["org.springframework.boot.context.properties.ConfigurationProperties"]
//! supertypes = ["com.acme.pool.BaseSettings<java.lang.String>"]
//!
//! [[type.field]]
//! name = "size"
//! type = "int"
//!
//! [[type.method]]
//! name = "getSize"
//! returns = "int"
//! ```
//!
//! Type strings use Java syntax and should be fully qualified.

use serde::Deserialize;

use super::classfile::ParsedClass;
use crate::core::types::TypeReference;
use crate::java::ast::{
    Annotation, DeclKind, EnumConstant, FieldDecl, MethodDecl, Modifiers, Param, TypeDecl,
    Visibility,
};
use crate::java::parse_type_reference;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SurfaceFile {
    #[serde(rename = "type", default)]
    types: Vec<TypeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeEntry {
    name: String,
    package: Option<String>,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    markers: Vec<String>,
    #[serde(default)]
    constants: Vec<String>,
    doc: Option<String>,
    #[serde(rename = "field", default)]
    fields: Vec<FieldEntry>,
    #[serde(rename = "method", default)]
    methods: Vec<MethodEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(rename = "static", default)]
    is_static: bool,
    #[serde(rename = "public", default)]
    is_public: bool,
    #[serde(default)]
    markers: Vec<String>,
    doc: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodEntry {
    name: String,
    returns: Option<String>,
    #[serde(default)]
    params: Vec<String>,
    #[serde(rename = "static", default)]
    is_static: bool,
    #[serde(default)]
    markers: Vec<String>,
    doc: Option<String>,
}

fn default_kind() -> String {
    "class".to_string()
}

/// Parse a descriptor into class surfaces.
pub fn parse_descriptor(text: &str) -> Result<Vec<ParsedClass>, String> {
    let file: SurfaceFile = toml::from_str(text).map_err(|e| e.to_string())?;
    file.types.into_iter().map(convert_type).collect()
}

fn convert_type(entry: TypeEntry) -> Result<ParsedClass, String> {
    let kind = DeclKind::parse(&entry.kind)
        .ok_or_else(|| format!("unknown kind `{}` for `{}`", entry.kind, entry.name))?;

    let (package, nesting) = match entry.package {
        Some(package) => {
            let rest = entry
                .name
                .strip_prefix(&package)
                .and_then(|rest| rest.strip_prefix('.'))
                .ok_or_else(|| format!("`{}` is not in package `{}`", entry.name, package))?;
            (package, rest.split('.').map(str::to_string).collect())
        }
        None => split_qualified_name(&entry.name),
    };

    let simple_name = nesting.last().cloned().unwrap_or_default();
    let mut decl = TypeDecl::new(simple_name, kind, 0);
    decl.modifiers.visibility = Visibility::Public;
    decl.doc = entry.doc;
    decl.type_params = entry.type_params;
    decl.annotations = annotations(entry.markers);
    decl.constants = entry
        .constants
        .into_iter()
        .map(|name| EnumConstant { name, doc: None })
        .collect();

    let supertypes = entry
        .supertypes
        .iter()
        .map(|s| type_of(s))
        .collect::<Result<Vec<_>, _>>()?;
    match kind {
        DeclKind::Interface | DeclKind::Annotation => decl.extends = supertypes,
        _ => {
            let mut supertypes = supertypes.into_iter();
            decl.extends.extend(supertypes.next());
            decl.implements = supertypes.collect();
        }
    }

    for field in entry.fields {
        let ty = type_of(&field.ty)?;
        if kind == DeclKind::Record && !field.is_static {
            decl.components.push(Param {
                name: field.name.clone(),
                ty: ty.clone(),
                annotations: Vec::new(),
            });
        }
        decl.fields.push(FieldDecl {
            name: field.name,
            ty,
            modifiers: Modifiers {
                visibility: if field.is_public {
                    Visibility::Public
                } else {
                    Visibility::Private
                },
                is_static: field.is_static,
                ..Modifiers::default()
            },
            annotations: annotations(field.markers),
            doc: field.doc,
            initializer: None,
            line: 0,
        });
    }

    for method in entry.methods {
        let return_type = match method.returns.as_deref() {
            None | Some("void") => None,
            Some(ty) => Some(type_of(ty)?),
        };
        let params = method
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(Param {
                    name: format!("arg{}", i),
                    ty: type_of(p)?,
                    annotations: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        decl.methods.push(MethodDecl {
            name: method.name,
            return_type,
            params,
            modifiers: Modifiers {
                visibility: Visibility::Public,
                is_static: method.is_static,
                is_abstract: kind == DeclKind::Interface,
                ..Modifiers::default()
            },
            annotations: annotations(method.markers),
            doc: method.doc,
            has_body: kind != DeclKind::Interface,
            line: 0,
        });
    }

    Ok(ParsedClass {
        package,
        nesting,
        decl,
    })
}

fn type_of(text: &str) -> Result<TypeReference, String> {
    parse_type_reference(text).ok_or_else(|| format!("malformed type `{}`", text))
}

fn annotations(markers: Vec<String>) -> Vec<Annotation> {
    markers
        .into_iter()
        .map(|name| Annotation {
            name,
            args: Vec::new(),
            line: 0,
        })
        .collect()
}

/// Split `com.acme.Outer.Inner` at the first capitalized segment.
fn split_qualified_name(name: &str) -> (String, Vec<String>) {
    let segments: Vec<&str> = name.split('.').collect();
    let split = segments
        .iter()
        .position(|s| s.starts_with(|c: char| c.is_uppercase()))
        .unwrap_or(segments.len().saturating_sub(1));
    let package = segments[..split].join(".");
    let nesting = segments[split..].iter().map(|s| s.to_string()).collect();
    (package, nesting)
}
