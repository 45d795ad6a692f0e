//! Cross-module symbol index.
//!
//! The index owns every declaration of every registered module in one arena
//! (`Vec<Declaration>` addressed by [`DeclId`]). Type containment is kept as a
//! directed graph over the same ids. Modules are parsed in parallel; their
//! declarations are inserted sequentially in registration order so ids are
//! stable from run to run.
//!
//! Once [`SourceIndex::build`] returns, the index is only read.

pub mod archive;
pub mod classfile;
pub mod decl;
pub mod descriptor;
pub mod errors;

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use glob::Pattern;
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;

use crate::core::marker::{Marker, MarkerKind, MarkerSet, MarkerValue};
use crate::core::types::DeclId;
use crate::java::ast::{Annotation, AnnotationValue, CompilationUnit, TypeDecl};
use crate::java::{clean_doc, parse_compilation_unit};
use crate::util::fs::files_with_extension;
use crate::util::hash::Fingerprint;

pub use decl::{
    DeclLocation, Declaration, Field, Method, ModuleId, ModuleKind, UnitId, UnitScope,
};
pub use errors::IndexError;

/// What to register: a named module, its roots and the modules it depends on.
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub kind: ModuleKind,
    pub roots: Vec<PathBuf>,
    /// Names of other registered modules.
    pub dependencies: Vec<String>,
    /// Source files to skip, relative to each root.
    pub exclude: Vec<Pattern>,
}

impl ModuleSpec {
    /// A module of `.java` sources.
    pub fn source(name: impl Into<String>, roots: Vec<PathBuf>) -> Self {
        ModuleSpec {
            name: name.into(),
            kind: ModuleKind::Source,
            roots,
            dependencies: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// A prebuilt dependency: class directory, jar or surface descriptor.
    pub fn archive(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ModuleSpec {
            name: name.into(),
            kind: ModuleKind::Archive,
            roots: vec![path.into()],
            dependencies: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn depends_on(mut self, module: impl Into<String>) -> Self {
        self.dependencies.push(module.into());
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<Pattern>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// A registered module.
#[derive(Debug, Clone)]
pub struct SourceModule {
    pub id: ModuleId,
    pub name: String,
    pub kind: ModuleKind,
    pub roots: Vec<PathBuf>,
    pub dependencies: Vec<String>,
    /// Compilation units, in file order.
    pub units: Vec<UnitId>,
    /// Declarations in source order, each outer type before its members.
    pub declarations: Vec<DeclId>,
    exclude: Vec<Pattern>,
    loaded: bool,
}

/// The cross-module symbol index.
#[derive(Debug)]
pub struct SourceIndex {
    markers: MarkerSet,
    modules: Vec<SourceModule>,
    module_names: HashMap<String, ModuleId>,
    units: Vec<UnitScope>,
    decls: Vec<Declaration>,
    by_name: HashMap<String, Vec<DeclId>>,
    containment: DiGraph<DeclId, ()>,
}

impl SourceIndex {
    pub fn new(markers: MarkerSet) -> Self {
        SourceIndex {
            markers,
            modules: Vec::new(),
            module_names: HashMap::new(),
            units: Vec::new(),
            decls: Vec::new(),
            by_name: HashMap::new(),
            containment: DiGraph::new(),
        }
    }

    /// Register a module. Its files are read by the next [`build`](Self::build).
    pub fn register(&mut self, spec: ModuleSpec) -> Result<ModuleId, IndexError> {
        if self.module_names.contains_key(&spec.name) {
            return Err(IndexError::DuplicateModule { name: spec.name });
        }

        let id = ModuleId(self.modules.len() as u32);
        self.module_names.insert(spec.name.clone(), id);
        self.modules.push(SourceModule {
            id,
            name: spec.name,
            kind: spec.kind,
            roots: spec.roots,
            dependencies: spec.dependencies,
            units: Vec::new(),
            declarations: Vec::new(),
            exclude: spec.exclude,
            loaded: false,
        });
        Ok(id)
    }

    /// Parse every registered module not yet loaded and index its declarations.
    ///
    /// All problems are collected; a module with errors still contributes
    /// whatever it could parse.
    pub fn build(&mut self) -> Vec<IndexError> {
        let mut errors = Vec::new();

        for module in &self.modules {
            for dep in &module.dependencies {
                if !self.module_names.contains_key(dep) {
                    errors.push(IndexError::ModuleNotFound { name: dep.clone() });
                }
            }
        }

        let pending: Vec<ModuleId> = self
            .modules
            .iter()
            .filter(|m| !m.loaded)
            .map(|m| m.id)
            .collect();

        let loaded: Vec<(ModuleId, Vec<CompilationUnit>, Vec<IndexError>)> = pending
            .par_iter()
            .map(|id| {
                let module = &self.modules[id.index()];
                let (units, errors) = load_module(module);
                (*id, units, errors)
            })
            .collect();

        for (id, units, load_errors) in loaded {
            errors.extend(load_errors);
            for unit in units {
                self.insert_unit(id, unit, &mut errors);
            }
            let module = &mut self.modules[id.index()];
            module.loaded = true;
            tracing::debug!(
                "indexed module `{}`: {} units, {} declarations",
                module.name,
                module.units.len(),
                module.declarations.len()
            );
        }

        errors
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Look up a module by name.
    pub fn resolve_module(&self, name: &str) -> Result<&SourceModule, IndexError> {
        self.module_names
            .get(name)
            .map(|id| &self.modules[id.index()])
            .ok_or_else(|| IndexError::ModuleNotFound {
                name: name.to_string(),
            })
    }

    pub fn module(&self, id: ModuleId) -> &SourceModule {
        &self.modules[id.index()]
    }

    pub fn modules(&self) -> &[SourceModule] {
        &self.modules
    }

    /// Every module `id` depends on, directly or transitively, nearest first.
    pub fn dependency_closure(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut seen = HashSet::from([id]);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for dep in &self.modules[current.index()].dependencies {
                if let Some(&dep_id) = self.module_names.get(dep) {
                    if seen.insert(dep_id) {
                        order.push(dep_id);
                        queue.push_back(dep_id);
                    }
                }
            }
        }

        order
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn unit(&self, id: UnitId) -> &UnitScope {
        &self.units[id.index()]
    }

    /// All declarations with this qualified name, in insertion order.
    pub fn lookup(&self, qualified_name: &str) -> &[DeclId] {
        self.by_name
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first declaration of `qualified_name` inside `module`.
    pub fn lookup_in(&self, qualified_name: &str, module: ModuleId) -> Option<DeclId> {
        self.lookup(qualified_name)
            .iter()
            .copied()
            .find(|id| self.decls[id.index()].module == module)
    }

    /// Member types declared directly inside `id`, in declaration order.
    pub fn member_types(&self, id: DeclId) -> Vec<DeclId> {
        let mut members: Vec<DeclId> = self
            .containment
            .neighbors(NodeIndex::new(id.index()))
            .map(|n| self.containment[n])
            .collect();
        members.sort();
        members
    }

    /// A member type of `id` by simple name.
    pub fn member_type(&self, id: DeclId, simple_name: &str) -> Option<DeclId> {
        self.member_types(id)
            .into_iter()
            .find(|m| self.decls[m.index()].simple_name == simple_name)
    }

    /// `id` followed by its enclosing declarations, innermost first.
    pub fn enclosing_chain(&self, id: DeclId) -> Vec<DeclId> {
        let mut chain = vec![id];
        let mut current = self.decls[id.index()].enclosing;
        while let Some(outer) = current {
            chain.push(outer);
            current = self.decls[outer.index()].enclosing;
        }
        chain
    }

    /// Whether the walker treats `id` as a property group: it carries a root
    /// or nested-group marker, or is a member type of such a declaration.
    pub fn is_holder(&self, id: DeclId) -> bool {
        self.enclosing_chain(id).into_iter().any(|d| {
            let decl = &self.decls[d.index()];
            !decl.is_enum()
                && (decl.has_marker(MarkerKind::Root) || decl.has_marker(MarkerKind::NestedGroup))
        }) && !self.decls[id.index()].is_enum()
    }

    /// Declarations of a source module that carry the root marker directly.
    pub fn root_declarations(&self, module: ModuleId) -> Vec<DeclId> {
        let module = &self.modules[module.index()];
        if module.kind != ModuleKind::Source {
            return Vec::new();
        }
        module
            .declarations
            .iter()
            .copied()
            .filter(|id| self.decls[id.index()].has_marker(MarkerKind::Root))
            .collect()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    fn insert_unit(&mut self, module: ModuleId, unit: CompilationUnit, errors: &mut Vec<IndexError>) {
        let unit_id = UnitId(self.units.len() as u32);
        self.units.push(UnitScope {
            module,
            path: unit.path,
            package: unit.package.unwrap_or_default(),
            imports: unit.imports,
        });
        self.modules[module.index()].units.push(unit_id);

        for decl in unit.types {
            self.insert_decl(module, unit_id, None, decl, errors);
        }
    }

    fn insert_decl(
        &mut self,
        module: ModuleId,
        unit: UnitId,
        enclosing: Option<DeclId>,
        decl: TypeDecl,
        errors: &mut Vec<IndexError>,
    ) {
        let id = DeclId(self.decls.len() as u32);
        let scope = &self.units[unit.index()];
        let package = scope.package.clone();

        let qualified_name = match enclosing {
            Some(outer) => format!("{}.{}", self.decls[outer.index()].qualified_name, decl.name),
            None if package.is_empty() => decl.name.clone(),
            None => format!("{}.{}", package, decl.name),
        };
        let simple_name = decl
            .name
            .rsplit('.')
            .next()
            .unwrap_or(&decl.name)
            .to_string();

        let signature = signature_fingerprint(&decl);
        if let Some(err) = self.check_duplicate(&qualified_name, module, &signature, scope, decl.line) {
            errors.push(err);
        }

        let markers = self.classify(&decl.annotations, scope);
        let location = DeclLocation {
            path: scope.path.clone(),
            line: decl.line,
        };

        let record_components: Vec<Field> = decl
            .components
            .iter()
            .map(|c| Field {
                name: c.name.clone(),
                ty: c.ty.clone(),
                is_static: false,
                is_public: false,
                markers: self.classify(&c.annotations, scope),
                doc: None,
                default: None,
                line: decl.line,
            })
            .collect();

        let mut fields = record_components;
        for f in &decl.fields {
            // Compiled records repeat their components as fields
            if fields.iter().any(|c| c.name == f.name) {
                continue;
            }
            fields.push(Field {
                name: f.name.clone(),
                ty: f.ty.clone(),
                is_static: f.modifiers.is_static,
                is_public: f.modifiers.is_public(),
                markers: self.classify(&f.annotations, scope),
                doc: f.doc.as_deref().and_then(clean_doc),
                default: f.initializer.clone(),
                line: f.line,
            });
        }

        let methods = decl
            .methods
            .iter()
            .filter(|m| m.modifiers.is_public())
            .map(|m| Method {
                name: m.name.clone(),
                return_type: m.return_type.clone(),
                params: m.params.iter().map(|p| p.ty.clone()).collect(),
                is_static: m.modifiers.is_static,
                is_public: true,
                is_abstract: m.modifiers.is_abstract,
                markers: self.classify(&m.annotations, scope),
                doc: m.doc.as_deref().and_then(clean_doc),
                line: m.line,
            })
            .collect();

        let declaration = Declaration {
            id,
            module,
            unit,
            qualified_name: qualified_name.clone(),
            simple_name,
            package,
            kind: decl.kind,
            enclosing,
            type_params: decl.type_params,
            supertypes: decl.extends.into_iter().chain(decl.implements).collect(),
            fields,
            methods,
            constants: decl.constants.into_iter().map(|c| c.name).collect(),
            markers,
            doc: decl.doc.as_deref().and_then(clean_doc),
            location,
            signature,
        };

        self.decls.push(declaration);
        let node = self.containment.add_node(id);
        debug_assert_eq!(node.index(), id.index());
        if let Some(outer) = enclosing {
            self.containment
                .add_edge(NodeIndex::new(outer.index()), node, ());
        }
        self.by_name.entry(qualified_name).or_default().push(id);
        self.modules[module.index()].declarations.push(id);

        for member in decl.members {
            self.insert_decl(module, unit, Some(id), member, errors);
        }
    }

    /// A duplicate is an error when the signatures differ, whichever modules
    /// the copies come from, or when one source module declares the name
    /// twice. Identical copies in different modules are tolerated.
    fn check_duplicate(
        &self,
        qualified_name: &str,
        module: ModuleId,
        signature: &str,
        scope: &UnitScope,
        line: u32,
    ) -> Option<IndexError> {
        let kind = self.modules[module.index()].kind;

        self.lookup(qualified_name).iter().find_map(|existing| {
            let other = &self.decls[existing.index()];
            let same_source_module = other.module == module && kind == ModuleKind::Source;
            if !same_source_module && other.signature == signature {
                return None;
            }

            let second = DeclLocation {
                path: scope.path.clone(),
                line,
            };
            Some(IndexError::DuplicateType {
                qualified_name: qualified_name.to_string(),
                first: other.location.to_string(),
                second: second.to_string(),
            })
        })
    }

    /// Resolve annotation names through the unit's imports and keep the
    /// recognized ones.
    fn classify(&self, annotations: &[Annotation], scope: &UnitScope) -> Vec<Marker> {
        annotations
            .iter()
            .filter_map(|annotation| {
                qualify_annotation(&annotation.name, scope)
                    .into_iter()
                    .find_map(|candidate| {
                        self.markers
                            .classify(&candidate)
                            .map(|kind| (kind, candidate))
                    })
                    .map(|(kind, qualified)| {
                        annotation
                            .args
                            .iter()
                            .fold(Marker::new(kind, qualified), |marker, (key, value)| {
                                marker.with_arg(key.clone(), marker_value(value))
                            })
                    })
            })
            .collect()
    }
}

/// Candidate qualified names for an annotation as written, most specific first.
fn qualify_annotation(name: &str, scope: &UnitScope) -> Vec<String> {
    if name.contains('.') {
        return vec![name.to_string()];
    }

    let mut candidates = Vec::new();
    candidates.extend(
        scope
            .single_imports()
            .filter(|i| i.simple_name() == name)
            .map(|i| i.path.clone()),
    );
    candidates.push(format!("java.lang.{}", name));
    if scope.package.is_empty() {
        candidates.push(name.to_string());
    } else {
        candidates.push(format!("{}.{}", scope.package, name));
    }
    candidates.extend(scope.wildcard_imports().map(|i| format!("{}.{}", i.path, name)));
    candidates
}

fn marker_value(value: &AnnotationValue) -> MarkerValue {
    match value {
        AnnotationValue::Str(s) => MarkerValue::Str(s.clone()),
        AnnotationValue::Literal(s) => MarkerValue::Literal(s.clone()),
        AnnotationValue::Name(s) => MarkerValue::Name(s.clone()),
        AnnotationValue::Array(items) => MarkerValue::List(items.iter().map(marker_value).collect()),
        AnnotationValue::Other => MarkerValue::Unknown,
    }
}

fn signature_fingerprint(decl: &TypeDecl) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(decl.kind.as_str());
    fp.update_strs(decl.type_params.iter().map(String::as_str));

    let supertypes: Vec<String> = decl
        .extends
        .iter()
        .chain(&decl.implements)
        .map(|t| t.to_string())
        .collect();
    fp.update_strs(supertypes.iter().map(String::as_str));

    let mut members: Vec<String> = decl
        .fields
        .iter()
        .map(|f| format!("field {} {}", f.ty, f.name))
        .chain(decl.components.iter().map(|c| format!("component {} {}", c.ty, c.name)))
        .chain(decl.methods.iter().filter(|m| m.modifiers.is_public()).map(|m| {
            let params: Vec<String> = m.params.iter().map(|p| p.ty.to_string()).collect();
            let ret = m
                .return_type
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "void".to_string());
            format!("method {} {}({})", ret, m.name, params.join(","))
        }))
        .chain(decl.constants.iter().map(|c| format!("constant {}", c.name)))
        .chain(decl.members.iter().map(|m| format!("member {}", m.name)))
        .collect();
    members.sort();
    fp.update_strs(members.iter().map(String::as_str));

    fp.finish()
}

/// Read and parse the files of one module.
fn load_module(module: &SourceModule) -> (Vec<CompilationUnit>, Vec<IndexError>) {
    match module.kind {
        ModuleKind::Source => load_sources(module),
        ModuleKind::Archive => {
            let mut units = Vec::new();
            let mut errors = Vec::new();
            for root in &module.roots {
                match archive::load_archive(root) {
                    Ok(loaded) => units.extend(loaded),
                    Err(err) => errors.push(err),
                }
            }
            (units, errors)
        }
    }
}

fn load_sources(module: &SourceModule) -> (Vec<CompilationUnit>, Vec<IndexError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for root in &module.roots {
        if !root.is_dir() {
            errors.push(IndexError::MissingRoot {
                module: module.name.clone(),
                path: root.clone(),
            });
            continue;
        }
        match files_with_extension(root, "java", &module.exclude) {
            Ok(found) => files.extend(found),
            Err(e) => errors.push(IndexError::Io {
                path: root.clone(),
                source: std::io::Error::other(format!("{:#}", e)),
            }),
        }
    }

    let parsed: Vec<Result<CompilationUnit, IndexError>> =
        files.par_iter().map(|path| parse_source_file(path)).collect();

    let mut units = Vec::new();
    for result in parsed {
        match result {
            Ok(unit) => units.push(unit),
            Err(err) => errors.push(err),
        }
    }
    (units, errors)
}

/// Parse one source file. Bytes that are not UTF-8 are replaced, so a stray
/// Latin-1 comment does not stop the build.
fn parse_source_file(path: &Path) -> Result<CompilationUnit, IndexError> {
    let bytes = std::fs::read(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = match String::from_utf8(bytes) {
        Ok(source) => source,
        Err(err) => {
            tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };
    Ok(parse_compilation_unit(path, &source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{write_file, write_tree};
    use tempfile::TempDir;

    fn index_with(modules: Vec<ModuleSpec>) -> (SourceIndex, Vec<IndexError>) {
        let mut index = SourceIndex::new(MarkerSet::default());
        for spec in modules {
            index.register(spec).unwrap();
        }
        let errors = index.build();
        (index, errors)
    }

    #[test]
    fn test_non_utf8_source_is_decoded_lossily() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("src/com/acme/Latin.java");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut bytes = b"package com.acme;\n/** Caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b" settings. */\npublic class Latin {\n    private int size;\n}\n");
        std::fs::write(&path, bytes).unwrap();

        let (index, errors) = index_with(vec![ModuleSpec::source("app", vec![tmp.path().join("src")])]);
        assert!(errors.is_empty(), "{:?}", errors);

        let decl = index.decl(index.lookup("com.acme.Latin")[0]);
        assert_eq!(decl.doc.as_deref(), Some("Caf\u{FFFD} settings."));
        assert!(decl.field("size").is_some());
    }

    #[test]
    fn test_build_indexes_nested_declarations() {
        let tmp = TempDir::new().unwrap();
        write_tree(
            tmp.path(),
            &[(
                "src/com/acme/AcmeProperties.java",
                r#"
package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;
import org.springframework.boot.context.properties.*;

/** Acme settings. */
@ConfigurationProperties(prefix = "acme")
public class AcmeProperties {
    /** Server port. */
    private int port = 8080;

    @NestedConfigurationProperty
    private Pool pool;

    @Deprecated
    public String getLegacy() { return null; }

    public static class Pool {
        private int size;
    }
}
"#,
            )],
        );

        let (index, errors) = index_with(vec![ModuleSpec::source("app", vec![tmp.path().join("src")])]);
        assert!(errors.is_empty(), "{:?}", errors);

        let module = index.resolve_module("app").unwrap();
        assert_eq!(module.declarations.len(), 2);

        let root = index.lookup("com.acme.AcmeProperties")[0];
        let decl = index.decl(root);
        assert_eq!(decl.doc.as_deref(), Some("Acme settings."));
        assert_eq!(decl.marker(MarkerKind::Root).unwrap().prefix(), Some("acme"));
        assert_eq!(decl.field("port").unwrap().doc.as_deref(), Some("Server port."));
        assert!(decl.field("pool").unwrap().markers[0].kind == MarkerKind::NestedGroup);
        assert_eq!(decl.methods[0].markers[0].annotation, "java.lang.Deprecated");
        assert_eq!(decl.location.line, 9);

        let pool = index.member_type(root, "Pool").unwrap();
        assert_eq!(index.decl(pool).qualified_name, "com.acme.AcmeProperties.Pool");
        assert_eq!(index.decl(pool).enclosing, Some(root));
        assert!(index.is_holder(pool));
        assert_eq!(index.root_declarations(module.id), vec![root]);
    }

    #[test]
    fn test_resolve_module_not_found() {
        let index = SourceIndex::new(MarkerSet::default());
        assert!(matches!(
            index.resolve_module("missing"),
            Err(IndexError::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn test_register_twice_fails() {
        let mut index = SourceIndex::new(MarkerSet::default());
        index.register(ModuleSpec::source("a", vec![])).unwrap();
        assert!(matches!(
            index.register(ModuleSpec::source("a", vec![])),
            Err(IndexError::DuplicateModule { .. })
        ));
    }

    #[test]
    fn test_unknown_dependency_and_missing_root_are_reported() {
        let (_, errors) = index_with(vec![ModuleSpec::source("app", vec![PathBuf::from("/nonexistent")])
            .depends_on("core")]);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, IndexError::ModuleNotFound { name } if name == "core")));
        assert!(errors.iter().any(|e| matches!(e, IndexError::MissingRoot { .. })));
    }

    #[test]
    fn test_conflicting_duplicate_across_source_modules() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a/com/acme/Shared.java"), "package com.acme; public class Shared { int x; }");
        write_file(&tmp.path().join("b/com/acme/Shared.java"), "package com.acme; public class Shared { long y; }");

        let (_, errors) = index_with(vec![
            ModuleSpec::source("a", vec![tmp.path().join("a")]),
            ModuleSpec::source("b", vec![tmp.path().join("b")]),
        ]);
        assert_eq!(errors.len(), 1);
        let IndexError::DuplicateType { qualified_name, .. } = &errors[0] else {
            panic!("unexpected error {:?}", errors[0]);
        };
        assert_eq!(qualified_name, "com.acme.Shared");
        assert_eq!(errors[0].kind(), crate::util::ErrorKind::DuplicateType);
    }

    #[test]
    fn test_identical_copies_are_tolerated() {
        let tmp = TempDir::new().unwrap();
        let body = "package com.acme; public class Shared { int x; }";
        write_file(&tmp.path().join("a/com/acme/Shared.java"), body);
        write_file(&tmp.path().join("b/com/acme/Shared.java"), body);

        let (index, errors) = index_with(vec![
            ModuleSpec::source("a", vec![tmp.path().join("a")]),
            ModuleSpec::source("b", vec![tmp.path().join("b")]),
        ]);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(index.lookup("com.acme.Shared").len(), 2);
    }

    #[test]
    fn test_conflicting_duplicate_across_source_and_archive() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a/com/acme/Shared.java"), "package com.acme; public class Shared { int x; }");
        write_file(
            &tmp.path().join("lib.toml"),
            "[[type]]\nname = \"com.acme.Shared\"\n[[type.field]]\nname = \"other\"\ntype = \"long\"\n",
        );

        let (_, errors) = index_with(vec![
            ModuleSpec::archive("lib", tmp.path().join("lib.toml")),
            ModuleSpec::source("a", vec![tmp.path().join("a")]).depends_on("lib"),
        ]);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        let IndexError::DuplicateType { qualified_name, .. } = &errors[0] else {
            panic!("unexpected error {:?}", errors[0]);
        };
        assert_eq!(qualified_name, "com.acme.Shared");
    }

    #[test]
    fn test_duplicate_within_one_source_module() {
        let tmp = TempDir::new().unwrap();
        let body = "package com.acme; public class Shared { int x; }";
        write_file(&tmp.path().join("src/one/Shared.java"), body);
        write_file(&tmp.path().join("src/two/Shared.java"), body);

        let (_, errors) = index_with(vec![ModuleSpec::source("a", vec![tmp.path().join("src")])]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], IndexError::DuplicateType { .. }));
    }

    #[test]
    fn test_syntax_errors_are_collected() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("src/Broken.java"), "class Broken {");
        write_file(&tmp.path().join("src/Fine.java"), "class Fine {}");

        let (index, errors) = index_with(vec![ModuleSpec::source("a", vec![tmp.path().join("src")])]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], IndexError::Syntax(_)));
        assert_eq!(index.lookup("Fine").len(), 1);
    }

    #[test]
    fn test_dependency_closure_is_breadth_first() {
        let (index, _) = index_with(vec![
            ModuleSpec::source("base", vec![]),
            ModuleSpec::source("core", vec![]).depends_on("base"),
            ModuleSpec::source("web", vec![]).depends_on("base"),
            ModuleSpec::source("app", vec![]).depends_on("core").depends_on("web"),
        ]);

        let app = index.resolve_module("app").unwrap().id;
        let names: Vec<&str> = index
            .dependency_closure(app)
            .into_iter()
            .map(|id| index.module(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["core", "web", "base"]);
    }

    #[test]
    fn test_annotation_qualification_through_wildcard_import() {
        let tmp = TempDir::new().unwrap();
        write_file(
            &tmp.path().join("src/Settings.java"),
            "import com.acme.config.*;\n@Settings(\"x\") class Settings {}",
        );

        let markers = MarkerSet {
            root: vec!["com.acme.config.Settings".to_string()],
            ..MarkerSet::default()
        };
        let mut index = SourceIndex::new(markers);
        index
            .register(ModuleSpec::source("a", vec![tmp.path().join("src")]))
            .unwrap();
        assert!(index.build().is_empty());

        let decl = index.decl(index.lookup("Settings")[0]);
        assert_eq!(decl.markers[0].kind, MarkerKind::Root);
        assert_eq!(decl.markers[0].prefix(), Some("x"));
    }
}
