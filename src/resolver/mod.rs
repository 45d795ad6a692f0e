//! Symbol resolution.
//!
//! [`SymbolResolver`] turns a [`TypeReference`] written inside a declaration
//! into a [`ResolvedType`]. Simple names are searched in priority groups:
//!
//! 1. type parameters of the scope and its enclosing declarations
//! 2. member types of the scope and its enclosing declarations
//! 3. single-type imports
//! 4. the scope's package in the current module
//! 5. wildcard imports satisfied by the current module
//! 6. the scope's package in dependency modules
//! 7. wildcard imports and `java.lang` satisfied by dependency modules
//! 8. the built-in platform table
//!
//! The first group with a match wins. Two different qualified names in the
//! same group are an ambiguity. Results are cached per (reference, scope)
//! for the lifetime of the resolver, which is one run.

pub mod cache;
pub mod errors;
pub mod platform;

use tracing::debug;

use crate::core::types::{DeclId, ResolvedType, TypeKind, TypeReference};
use crate::index::{ModuleId, SourceIndex, UnitScope};

pub use cache::ResolutionCache;
pub use errors::ResolveError;
pub use platform::PlatformKind;

/// What a name resolved to, before type arguments are applied.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Decl(DeclId),
    Platform(String, PlatformKind),
    Variable(String),
    /// Named explicitly but not visible; kept as an opaque type.
    Absent(String),
}

impl Target {
    fn name<'i>(&'i self, index: &'i SourceIndex) -> &'i str {
        match self {
            Target::Decl(id) => &index.decl(*id).qualified_name,
            Target::Platform(name, _) | Target::Variable(name) | Target::Absent(name) => name,
        }
    }
}

/// Resolves type references against a built [`SourceIndex`].
///
/// The resolver is the per-run resolution context: it owns the cache, and
/// is shared by reference between every thread of the run.
#[derive(Debug)]
pub struct SymbolResolver<'a> {
    index: &'a SourceIndex,
    cache: ResolutionCache,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(index: &'a SourceIndex) -> Self {
        SymbolResolver {
            index,
            cache: ResolutionCache::new(),
        }
    }

    pub fn index(&self) -> &'a SourceIndex {
        self.index
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve `reference` as written inside the declaration `scope`.
    pub fn resolve(&self, reference: &TypeReference, scope: DeclId) -> Result<ResolvedType, ResolveError> {
        if let Some(hit) = self.cache.get(reference, scope) {
            return Ok(hit);
        }
        let resolved = self.resolve_uncached(reference, scope)?;
        Ok(self.cache.insert(reference.clone(), scope, resolved))
    }

    /// Resolved supertypes of `id`, superclass first.
    pub fn supertypes(&self, id: DeclId) -> Result<Vec<ResolvedType>, ResolveError> {
        self.index
            .decl(id)
            .supertypes
            .iter()
            .map(|st| self.resolve(st, id))
            .collect()
    }

    fn resolve_uncached(&self, reference: &TypeReference, scope: DeclId) -> Result<ResolvedType, ResolveError> {
        if let Some(component) = reference.component() {
            let element = self.resolve(&component, scope)?;
            return Ok(ResolvedType::array_of(element));
        }
        if reference.is_primitive() {
            return Ok(ResolvedType::primitive(reference.name.clone()));
        }
        if reference.is_wildcard() {
            return Ok(ResolvedType::object());
        }

        let args = reference
            .args
            .iter()
            .map(|arg| self.resolve(arg, scope))
            .collect::<Result<Vec<_>, _>>()?;

        let target = if reference.is_qualified() {
            self.lookup_qualified(&reference.name, scope)?
        } else {
            self.lookup_simple(&reference.name, scope)?
                .ok_or_else(|| self.unresolved(&reference.name, scope))?
        };

        Ok(self.apply(target, args))
    }

    fn apply(&self, target: Target, args: Vec<ResolvedType>) -> ResolvedType {
        match target {
            Target::Variable(name) => ResolvedType::variable(name),
            Target::Decl(id) => {
                let decl = self.index.decl(id);
                let kind = if decl.is_enum() {
                    TypeKind::Enum(id)
                } else if self.index.is_holder(id) {
                    TypeKind::Holder(id)
                } else {
                    TypeKind::Opaque(Some(id))
                };
                ResolvedType::new(decl.qualified_name.clone(), args, kind)
            }
            Target::Platform(name, kind) => {
                let arg = |i: usize| args.get(i).cloned().unwrap_or_else(ResolvedType::object);
                let kind = match kind {
                    PlatformKind::Scalar => TypeKind::Opaque(None),
                    PlatformKind::Collection => TypeKind::CollectionOf(Box::new(arg(0))),
                    PlatformKind::Map => TypeKind::MapOf(Box::new(arg(0)), Box::new(arg(1))),
                    PlatformKind::StringMap => TypeKind::MapOf(
                        Box::new(ResolvedType::opaque("java.lang.String")),
                        Box::new(ResolvedType::opaque("java.lang.String")),
                    ),
                };
                ResolvedType::new(name, args, kind)
            }
            Target::Absent(name) => ResolvedType::new(name, args, TypeKind::Opaque(None)),
        }
    }

    // ------------------------------------------------------------------
    // Name lookup
    // ------------------------------------------------------------------

    fn lookup_simple(&self, name: &str, scope: DeclId) -> Result<Option<Target>, ResolveError> {
        let decl = self.index.decl(scope);
        let unit = self.index.unit(decl.unit);
        let module = decl.module;
        let chain = self.index.enclosing_chain(scope);

        // Type parameters shadow everything, innermost first
        if chain
            .iter()
            .any(|c| self.index.decl(*c).type_params.iter().any(|p| p == name))
        {
            return Ok(Some(Target::Variable(name.to_string())));
        }

        if let Some(member) = chain.iter().find_map(|c| self.index.member_type(*c, name)) {
            return Ok(Some(Target::Decl(member)));
        }

        let deps = self.index.dependency_closure(module);

        let single: Vec<Target> = unit
            .single_imports()
            .filter(|i| i.simple_name() == name)
            .map(|i| self.import_target(&i.path, module, &deps))
            .collect();
        if let Some(found) = self.pick(name, scope, single)? {
            return Ok(Some(found));
        }

        let same_package = qualify(&unit.package, name);
        if let Some(id) = self.index.lookup_in(&same_package, module) {
            return Ok(Some(Target::Decl(id)));
        }

        let local_wildcards: Vec<Target> = wildcard_candidates(unit, name)
            .filter_map(|q| self.index.lookup_in(&q, module))
            .map(Target::Decl)
            .collect();
        if let Some(found) = self.pick(name, scope, local_wildcards)? {
            return Ok(Some(found));
        }

        if let Some(id) = deps
            .iter()
            .find_map(|dep| self.index.lookup_in(&same_package, *dep))
        {
            return Ok(Some(Target::Decl(id)));
        }

        let dep_wildcards: Vec<Target> = wildcard_candidates(unit, name)
            .chain(std::iter::once(format!("java.lang.{}", name)))
            .filter_map(|q| deps.iter().find_map(|dep| self.index.lookup_in(&q, *dep)))
            .map(Target::Decl)
            .collect();
        if let Some(found) = self.pick(name, scope, dep_wildcards)? {
            return Ok(Some(found));
        }

        let platform: Vec<Target> = std::iter::once(format!("java.lang.{}", name))
            .chain(wildcard_candidates(unit, name))
            .filter_map(|q| platform::lookup(&q).map(|kind| Target::Platform(q, kind)))
            .collect();
        self.pick(name, scope, platform)
    }

    /// `a.b.C` or `Outer.Inner`.
    fn lookup_qualified(&self, name: &str, scope: DeclId) -> Result<Target, ResolveError> {
        let module = self.index.decl(scope).module;
        let deps = self.index.dependency_closure(module);

        if let Some(id) = self.visible(name, module, &deps) {
            return Ok(Target::Decl(id));
        }
        if let Some(kind) = platform::lookup(name) {
            return Ok(Target::Platform(name.to_string(), kind));
        }

        let (head, rest) = name.split_once('.').unwrap_or((name, ""));
        let starts_upper = head.chars().next().is_some_and(char::is_uppercase);
        if !starts_upper {
            debug!("`{}` is not visible from `{}`, keeping it opaque", name, self.index.decl(scope).qualified_name);
            return Ok(Target::Absent(name.to_string()));
        }

        match self.lookup_simple(head, scope)? {
            Some(Target::Decl(outer)) => {
                let mut current = outer;
                for segment in rest.split('.') {
                    match self.index.member_type(current, segment) {
                        Some(member) => current = member,
                        None => {
                            let partial = format!("{}.{}", self.index.decl(outer).qualified_name, rest);
                            return Ok(Target::Absent(partial));
                        }
                    }
                }
                Ok(Target::Decl(current))
            }
            Some(other) => {
                let outer = other.name(self.index).to_string();
                Ok(Target::Absent(format!("{}.{}", outer, rest)))
            }
            None => Err(self.unresolved(name, scope)),
        }
    }

    fn import_target(&self, path: &str, module: ModuleId, deps: &[ModuleId]) -> Target {
        if let Some(id) = self.visible(path, module, deps) {
            Target::Decl(id)
        } else if let Some(kind) = platform::lookup(path) {
            Target::Platform(path.to_string(), kind)
        } else {
            debug!("import `{}` is not indexed, keeping it opaque", path);
            Target::Absent(path.to_string())
        }
    }

    /// A declaration visible from `module`: its own first, then the nearest dependency.
    fn visible(&self, qualified_name: &str, module: ModuleId, deps: &[ModuleId]) -> Option<DeclId> {
        self.index.lookup_in(qualified_name, module).or_else(|| {
            deps.iter()
                .find_map(|dep| self.index.lookup_in(qualified_name, *dep))
        })
    }

    /// The single candidate of a priority group, or an ambiguity error.
    fn pick(&self, name: &str, scope: DeclId, group: Vec<Target>) -> Result<Option<Target>, ResolveError> {
        let mut distinct: Vec<Target> = Vec::new();
        for target in group {
            if !distinct
                .iter()
                .any(|d| d.name(self.index) == target.name(self.index))
            {
                distinct.push(target);
            }
        }

        if distinct.len() > 1 {
            let decl = self.index.decl(scope);
            return Err(ResolveError::Ambiguous {
                reference: name.to_string(),
                scope: decl.qualified_name.clone(),
                location: decl.location.to_string(),
                candidates: distinct
                    .iter()
                    .map(|t| t.name(self.index).to_string())
                    .collect(),
            });
        }
        Ok(distinct.pop())
    }

    fn unresolved(&self, name: &str, scope: DeclId) -> ResolveError {
        let decl = self.index.decl(scope);
        ResolveError::Unresolved {
            reference: name.to_string(),
            scope: decl.qualified_name.clone(),
            location: decl.location.to_string(),
        }
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

fn wildcard_candidates<'s>(unit: &'s UnitScope, name: &'s str) -> impl Iterator<Item = String> + 's {
    unit.wildcard_imports()
        .map(move |i| format!("{}.{}", i.path, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::marker::MarkerSet;
    use crate::index::ModuleSpec;
    use crate::test_support::fixtures::write_tree;
    use crate::util::ErrorKind;
    use tempfile::TempDir;

    fn build(modules: Vec<ModuleSpec>) -> SourceIndex {
        let mut index = SourceIndex::new(MarkerSet::default());
        for spec in modules {
            index.register(spec).unwrap();
        }
        let errors = index.build();
        assert!(errors.is_empty(), "{:?}", errors);
        index
    }

    fn field_type(index: &SourceIndex, owner: &str, field: &str) -> (DeclId, TypeReference) {
        let id = index.lookup(owner)[0];
        (id, index.decl(id).field(field).unwrap().ty.clone())
    }

    const LIB_TIMEOUT: &str = "[[type]]\nname = \"com.acme.Timeout\"\n[[type.field]]\nname = \"millis\"\ntype = \"long\"\n";

    #[test]
    fn test_local_type_beats_dependency_wildcard_import() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                (
                    "lib.toml",
                    "[[type]]\nname = \"com.acme.lib.Timeout\"\n[[type.field]]\nname = \"millis\"\ntype = \"long\"\n",
                ),
                ("app/com/acme/Timeout.java", "package com.acme; public class Timeout { int seconds; }"),
                (
                    "app/com/acme/AppProps.java",
                    "package com.acme;\nimport com.acme.lib.*;\npublic class AppProps { Timeout timeout; }",
                ),
            ],
        );

        let index = build(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("app", vec![tmp.path().join("app")]).depends_on("lib"),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "timeout");

        let resolved = resolver.resolve(&ty, scope).unwrap();
        assert_eq!(resolved.name, "com.acme.Timeout");
        let decl = index.decl(resolved.decl().unwrap());
        assert_eq!(index.module(decl.module).name, "app");
    }

    #[test]
    fn test_dependency_declaration_in_same_package() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("lib.toml", LIB_TIMEOUT),
                ("app/com/acme/AppProps.java", "package com.acme; public class AppProps { Timeout timeout; }"),
            ],
        );

        let index = build(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("app", vec![tmp.path().join("app")]).depends_on("lib"),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "timeout");

        let resolved = resolver.resolve(&ty, scope).unwrap();
        let decl = index.decl(resolved.decl().unwrap());
        assert_eq!(index.module(decl.module).name, "lib");
        assert_eq!(resolved.kind, TypeKind::Opaque(Some(decl.id)));
    }

    #[test]
    fn test_single_import_beats_same_package() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("lib.toml", "[[type]]\nname = \"com.acme.lib.Pool\"\n"),
                ("app/com/acme/Pool.java", "package com.acme; class Pool {}"),
                (
                    "app/com/acme/AppProps.java",
                    "package com.acme;\nimport com.acme.lib.Pool;\npublic class AppProps { Pool pool; }",
                ),
            ],
        );

        let index = build(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("app", vec![tmp.path().join("app")]).depends_on("lib"),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "pool");

        assert_eq!(resolver.resolve(&ty, scope).unwrap().name, "com.acme.lib.Pool");
    }

    #[test]
    fn test_same_package_beats_wildcard_import() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("lib.toml", "[[type]]\nname = \"com.acme.lib.Pool\"\n"),
                ("app/com/acme/Pool.java", "package com.acme; class Pool {}"),
                (
                    "app/com/acme/AppProps.java",
                    "package com.acme;\nimport com.acme.lib.*;\npublic class AppProps { Pool pool; }",
                ),
            ],
        );

        let index = build(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("app", vec![tmp.path().join("app")]).depends_on("lib"),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "pool");

        assert_eq!(resolver.resolve(&ty, scope).unwrap().name, "com.acme.Pool");
    }

    #[test]
    fn test_two_wildcards_are_ambiguous() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                (
                    "lib.toml",
                    "[[type]]\nname = \"com.a.Timeout\"\n[[type]]\nname = \"com.b.Timeout\"\n",
                ),
                (
                    "app/com/acme/AppProps.java",
                    "package com.acme;\nimport com.a.*;\nimport com.b.*;\npublic class AppProps { Timeout timeout; }",
                ),
            ],
        );

        let index = build(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("app", vec![tmp.path().join("app")]).depends_on("lib"),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "timeout");

        let err = resolver.resolve(&ty, scope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousSymbol);
        let ResolveError::Ambiguous { candidates, .. } = err else {
            panic!("expected ambiguity");
        };
        assert_eq!(candidates, vec!["com.a.Timeout", "com.b.Timeout"]);
    }

    #[test]
    fn test_generic_collections_and_maps() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[(
                "app/com/acme/AppProps.java",
                r#"
package com.acme;

import java.util.*;
import org.springframework.boot.context.properties.ConfigurationProperties;

@ConfigurationProperties("app")
public class AppProps {
    private Map<String, List<Pool>> pools;
    private String[] names;
    private Properties extra;

    public static class Pool {}
}
"#,
            )],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);

        let (scope, ty) = field_type(&index, "com.acme.AppProps", "pools");
        let pools = resolver.resolve(&ty, scope).unwrap();
        assert_eq!(
            pools.render(),
            "java.util.Map<java.lang.String,java.util.List<com.acme.AppProps.Pool>>"
        );
        let TypeKind::MapOf(key, value) = &pools.kind else {
            panic!("expected a map, got {:?}", pools.kind);
        };
        assert_eq!(key.name, "java.lang.String");
        let TypeKind::CollectionOf(element) = &value.kind else {
            panic!("expected a collection");
        };
        assert!(element.is_holder());

        let (_, ty) = field_type(&index, "com.acme.AppProps", "names");
        let names = resolver.resolve(&ty, scope).unwrap();
        assert!(names.is_array());
        assert_eq!(names.name, "java.lang.String[]");

        let (_, ty) = field_type(&index, "com.acme.AppProps", "extra");
        let extra = resolver.resolve(&ty, scope).unwrap();
        assert!(matches!(extra.kind, TypeKind::MapOf(..)));
    }

    #[test]
    fn test_type_variables_and_generic_supertypes() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("app/com/acme/Base.java", "package com.acme; public class Base<T> { T value; }"),
                ("app/com/acme/Derived.java", "package com.acme; public class Derived extends Base<Integer> {}"),
            ],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);

        let (scope, ty) = field_type(&index, "com.acme.Base", "value");
        assert_eq!(resolver.resolve(&ty, scope).unwrap(), ResolvedType::variable("T"));

        let derived = index.lookup("com.acme.Derived")[0];
        let supertypes = resolver.supertypes(derived).unwrap();
        assert_eq!(supertypes[0].render(), "com.acme.Base<java.lang.Integer>");
    }

    #[test]
    fn test_unresolved_simple_name() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[("app/com/acme/AppProps.java", "package com.acme;\npublic class AppProps { Missing thing; }")],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "thing");

        let err = resolver.resolve(&ty, scope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnresolvedSymbol);
        assert!(err.to_string().contains("`Missing`"));
        assert!(err.to_diagnostic().format(false).contains("AppProps.java:2"));
    }

    #[test]
    fn test_explicit_names_outside_the_index_stay_opaque() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[(
                "app/com/acme/AppProps.java",
                "package com.acme;\nimport org.springframework.util.unit.DataSize;\npublic class AppProps { DataSize size; org.other.Thing thing; }",
            )],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);

        let (scope, ty) = field_type(&index, "com.acme.AppProps", "size");
        assert_eq!(
            resolver.resolve(&ty, scope).unwrap(),
            ResolvedType::opaque("org.springframework.util.unit.DataSize")
        );

        let (_, ty) = field_type(&index, "com.acme.AppProps", "thing");
        assert_eq!(resolver.resolve(&ty, scope).unwrap(), ResolvedType::opaque("org.other.Thing"));
    }

    #[test]
    fn test_member_types_and_qualified_member_names() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                (
                    "app/com/acme/Outer.java",
                    "package com.acme; public class Outer { Inner inner; public enum Inner { A, B } }",
                ),
                ("app/com/acme/User.java", "package com.acme; public class User { Outer.Inner mode; }"),
            ],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);
        let inner = index.lookup("com.acme.Outer.Inner")[0];

        let (scope, ty) = field_type(&index, "com.acme.Outer", "inner");
        assert_eq!(resolver.resolve(&ty, scope).unwrap().kind, TypeKind::Enum(inner));

        let (scope, ty) = field_type(&index, "com.acme.User", "mode");
        let resolved = resolver.resolve(&ty, scope).unwrap();
        assert_eq!(resolved.name, "com.acme.Outer.Inner");
        assert_eq!(resolved.kind, TypeKind::Enum(inner));
    }

    #[test]
    fn test_modules_outside_dependency_closure_are_invisible() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[
                ("other/com/acme/Timeout.java", "package com.acme; public class Timeout {}"),
                ("app/com/acme/AppProps.java", "package com.acme; public class AppProps { Timeout timeout; }"),
            ],
        );

        let index = build(vec![
            ModuleSpec::source("other", vec![tmp.path().join("other")]),
            ModuleSpec::source("app", vec![tmp.path().join("app")]),
        ]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "timeout");

        assert!(matches!(
            resolver.resolve(&ty, scope),
            Err(ResolveError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_results_are_cached_per_scope() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[(
                "app/com/acme/AppProps.java",
                "package com.acme;\nimport java.util.List;\npublic class AppProps { List<String> names; }",
            )],
        );

        let index = build(vec![ModuleSpec::source("app", vec![tmp.path().join("app")])]);
        let resolver = SymbolResolver::new(&index);
        let (scope, ty) = field_type(&index, "com.acme.AppProps", "names");

        let first = resolver.resolve(&ty, scope).unwrap();
        let cached = resolver.cache().len();
        assert!(cached >= 2);

        let second = resolver.resolve(&ty, scope).unwrap();
        assert_eq!(first, second);
        assert_eq!(resolver.cache().len(), cached);
    }
}
