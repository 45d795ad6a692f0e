//! Exposed members of a holder declaration.
//!
//! A member is exposed as a property when it is:
//! - a record component
//! - a getter declared on an interface
//! - a non-static field that is public, has a getter, or carries an accessor
//!   marker (directly or on its class)
//! - a getter paired with a setter that has no backing field
//!
//! Members of supertypes come first; a redeclared member replaces the
//! inherited one in place.

use std::collections::{HashMap, HashSet};

use crate::core::marker::{has_marker, Marker, MarkerKind};
use crate::core::types::{DeclId, ResolvedType, TypeReference};
use crate::index::{Declaration, Method, SourceIndex};
use crate::java::ast::{DeclKind, Initializer};
use crate::resolver::{ResolveError, SymbolResolver};

/// One exposed member, not yet resolved.
#[derive(Debug, Clone)]
pub struct Member {
    /// Property name as declared (field name or decapitalized accessor name).
    pub name: String,
    /// Declaration whose scope `ty` is written in.
    pub declared_in: DeclId,
    pub ty: TypeReference,
    /// Type arguments bound to `declared_in`'s type parameters.
    pub bindings: HashMap<String, ResolvedType>,
    /// Markers of the field and its accessor.
    pub markers: Vec<Marker>,
    pub doc: Option<String>,
    pub default: Option<Initializer>,
    pub line: u32,
}

/// Bind `decl`'s type parameters to the arguments of `ty`.
pub fn bindings_for(decl: &Declaration, ty: &ResolvedType) -> HashMap<String, ResolvedType> {
    decl.type_params
        .iter()
        .cloned()
        .zip(ty.args.iter().cloned())
        .collect()
}

/// Every exposed member of `holder`, inherited ones first.
pub fn collect_members(
    resolver: &SymbolResolver<'_>,
    holder: DeclId,
    bindings: &HashMap<String, ResolvedType>,
) -> Result<Vec<Member>, ResolveError> {
    let mut members = Vec::new();
    let mut visited = HashSet::new();
    collect_into(resolver, holder, bindings, &mut members, &mut visited)?;
    Ok(members)
}

fn collect_into(
    resolver: &SymbolResolver<'_>,
    holder: DeclId,
    bindings: &HashMap<String, ResolvedType>,
    members: &mut Vec<Member>,
    visited: &mut HashSet<DeclId>,
) -> Result<(), ResolveError> {
    if !visited.insert(holder) {
        return Ok(());
    }
    let index = resolver.index();

    for supertype in resolver.supertypes(holder)? {
        let Some(parent) = supertype.decl() else {
            continue;
        };
        if index.decl(parent).is_enum() {
            continue;
        }
        let parent_bindings = bindings_for(index.decl(parent), &supertype.substitute(bindings));
        collect_into(resolver, parent, &parent_bindings, members, visited)?;
    }

    for member in declared_members(index, holder, bindings) {
        match members.iter_mut().find(|m| m.name == member.name) {
            Some(inherited) => *inherited = member,
            None => members.push(member),
        }
    }
    Ok(())
}

fn declared_members(
    index: &SourceIndex,
    holder: DeclId,
    bindings: &HashMap<String, ResolvedType>,
) -> Vec<Member> {
    let decl = index.decl(holder);
    let member = |name: &str,
                  ty: &TypeReference,
                  markers: Vec<Marker>,
                  doc: Option<String>,
                  default: Option<Initializer>,
                  line: u32| Member {
        name: name.to_string(),
        declared_in: holder,
        ty: ty.clone(),
        bindings: bindings.clone(),
        markers,
        doc,
        default,
        line,
    };

    match decl.kind {
        DeclKind::Record => decl
            .fields
            .iter()
            .filter(|f| !f.is_static)
            .map(|f| member(&f.name, &f.ty, f.markers.clone(), f.doc.clone(), None, f.line))
            .collect(),

        DeclKind::Interface => decl
            .methods
            .iter()
            .filter_map(|m| getter_property(m).map(|name| (name, m)))
            .filter_map(|(name, m)| {
                let ty = m.return_type.as_ref()?;
                Some(member(&name, ty, m.markers.clone(), m.doc.clone(), None, m.line))
            })
            .collect(),

        DeclKind::Enum | DeclKind::Annotation => Vec::new(),

        DeclKind::Class => {
            let class_accessors = decl.has_marker(MarkerKind::Accessor);
            let mut members: Vec<Member> = decl
                .fields
                .iter()
                .filter(|f| !f.is_static)
                .filter_map(|f| {
                    let getter = find_getter(decl, &f.name);
                    let exposed = f.is_public
                        || getter.is_some()
                        || class_accessors
                        || has_marker(&f.markers, MarkerKind::Accessor);
                    if !exposed {
                        return None;
                    }

                    let mut markers = f.markers.clone();
                    let mut doc = f.doc.clone();
                    if let Some(getter) = getter {
                        markers.extend(getter.markers.iter().cloned());
                        doc = doc.or_else(|| getter.doc.clone());
                    }
                    Some(member(&f.name, &f.ty, markers, doc, f.default.clone(), f.line))
                })
                .collect();

            // Accessor pairs without a backing field
            for method in &decl.methods {
                let Some(name) = getter_property(method) else {
                    continue;
                };
                let Some(ty) = method.return_type.as_ref() else {
                    continue;
                };
                if decl.field(&name).is_some() || members.iter().any(|m| m.name == name) {
                    continue;
                }
                if decl.method(&format!("set{}", capitalize(&name)), 1).is_none() {
                    continue;
                }
                members.push(member(
                    &name,
                    ty,
                    method.markers.clone(),
                    method.doc.clone(),
                    None,
                    method.line,
                ));
            }

            members
        }
    }
}

fn find_getter<'d>(decl: &'d Declaration, field: &str) -> Option<&'d Method> {
    let suffix = capitalize(field);
    decl.method(&format!("get{}", suffix), 0)
        .or_else(|| decl.method(&format!("is{}", suffix), 0))
}

/// `getMaxAttempts` -> `maxAttempts`, `isEnabled` -> `enabled` (boolean only).
fn getter_property(method: &Method) -> Option<String> {
    if method.is_static || !method.params.is_empty() || method.name == "getClass" {
        return None;
    }
    let ret = method.return_type.as_ref()?;

    let rest = if let Some(rest) = method.name.strip_prefix("get") {
        rest
    } else if let Some(rest) = method.name.strip_prefix("is") {
        if ret.array_dims != 0 || !(ret.name == "boolean" || ret.name == "Boolean" || ret.name == "java.lang.Boolean") {
            return None;
        }
        rest
    } else {
        return None;
    };

    if !rest.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }
    Some(decapitalize(rest))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JavaBeans decapitalization: `URL` stays `URL`, `Port` becomes `port`.
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }
    first.to_lowercase().chain(name.chars().skip(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::marker::MarkerSet;
    use crate::index::ModuleSpec;
    use crate::test_support::fixtures::write_tree;
    use tempfile::TempDir;

    fn build(files: &[(&str, &str)]) -> (TempDir, SourceIndex) {
        let tmp = TempDir::new().unwrap();
        write_tree(tmp.path(), files);
        let mut index = SourceIndex::new(MarkerSet::default());
        index
            .register(ModuleSpec::source("app", vec![tmp.path().to_path_buf()]))
            .unwrap();
        let errors = index.build();
        assert!(errors.is_empty(), "{:?}", errors);
        (tmp, index)
    }

    fn names(members: &[Member]) -> Vec<&str> {
        members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_exposure_rules() {
        let (_tmp, index) = build(&[(
            "com/acme/Settings.java",
            r#"
package com.acme;
public class Settings {
    public String name;
    private int port;
    private int hidden;
    private static int COUNTER;

    public int getPort() { return port; }

    /** Computed URL. */
    public String getURL() { return null; }
    public void setURL(String url) {}

    public boolean isEnabled() { return true; }
    public void setEnabled(boolean enabled) {}

    public String getReadOnly() { return null; }
}
"#,
        )]);
        let resolver = SymbolResolver::new(&index);
        let id = index.lookup("com.acme.Settings")[0];

        let members = collect_members(&resolver, id, &HashMap::new()).unwrap();
        assert_eq!(names(&members), vec!["name", "port", "URL", "enabled"]);
        assert_eq!(members[2].doc.as_deref(), Some("Computed URL."));
    }

    #[test]
    fn test_lombok_and_records_and_interfaces() {
        let (_tmp, index) = build(&[
            (
                "com/acme/Pool.java",
                "package com.acme;\nimport lombok.Data;\n@Data public class Pool { private int size; private String name; }",
            ),
            ("com/acme/Endpoint.java", "package com.acme; public record Endpoint(String host, int port) {}"),
            (
                "com/acme/Limits.java",
                "package com.acme; public interface Limits { int getMax(); boolean isStrict(); String describe(); }",
            ),
        ]);
        let resolver = SymbolResolver::new(&index);

        let pool = index.lookup("com.acme.Pool")[0];
        assert_eq!(names(&collect_members(&resolver, pool, &HashMap::new()).unwrap()), vec!["size", "name"]);

        let endpoint = index.lookup("com.acme.Endpoint")[0];
        assert_eq!(
            names(&collect_members(&resolver, endpoint, &HashMap::new()).unwrap()),
            vec!["host", "port"]
        );

        let limits = index.lookup("com.acme.Limits")[0];
        assert_eq!(
            names(&collect_members(&resolver, limits, &HashMap::new()).unwrap()),
            vec!["max", "strict"]
        );
    }

    #[test]
    fn test_inherited_members_come_first_with_bindings() {
        let (_tmp, index) = build(&[
            (
                "com/acme/Base.java",
                "package com.acme; public class Base<T> { public T value; public String shared; }",
            ),
            (
                "com/acme/Derived.java",
                "package com.acme; public class Derived extends Base<Integer> { public int own; public String shared; }",
            ),
        ]);
        let resolver = SymbolResolver::new(&index);
        let derived = index.lookup("com.acme.Derived")[0];

        let members = collect_members(&resolver, derived, &HashMap::new()).unwrap();
        assert_eq!(names(&members), vec!["value", "shared", "own"]);
        assert_eq!(members[0].declared_in, index.lookup("com.acme.Base")[0]);
        assert_eq!(members[0].bindings["T"].name, "java.lang.Integer");
        assert_eq!(members[1].declared_in, derived);
    }

    #[test]
    fn test_decapitalize() {
        assert_eq!(decapitalize("MaxAttempts"), "maxAttempts");
        assert_eq!(decapitalize("URL"), "URL");
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(capitalize("port"), "Port");
    }
}
