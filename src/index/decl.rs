//! Arena entries of the source index.

use std::fmt;
use std::path::PathBuf;

use crate::core::marker::{find_marker, has_marker, Marker, MarkerKind};
use crate::core::types::{DeclId, TypeReference};
use crate::java::ast::{DeclKind, Import, Initializer};

/// Index of a registered module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a compilation unit's lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a module carries sources or only a prebuilt public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// `.java` source roots; metadata is extracted from these.
    Source,
    /// Class directories, jars or surface descriptors; used for resolution only.
    Archive,
}

/// The lexical scope of one compilation unit: its package and imports.
#[derive(Debug, Clone)]
pub struct UnitScope {
    pub module: ModuleId,
    pub path: PathBuf,
    /// Dotted package name, empty for the default package.
    pub package: String,
    pub imports: Vec<Import>,
}

impl UnitScope {
    /// Single-type (non-static) imports.
    pub fn single_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| !i.wildcard && !i.is_static)
    }

    /// On-demand (`.*`, non-static) imports.
    pub fn wildcard_imports(&self) -> impl Iterator<Item = &Import> {
        self.imports.iter().filter(|i| i.wildcard && !i.is_static)
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclLocation {
    pub path: PathBuf,
    /// 1-based line, 0 when unknown (compiled classes).
    pub line: u32,
}

impl fmt::Display for DeclLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.path.display())
        } else {
            write!(f, "{}:{}", self.path.display(), self.line)
        }
    }
}

/// A type declaration, with markers already classified.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub id: DeclId,
    pub module: ModuleId,
    pub unit: UnitId,
    pub qualified_name: String,
    pub simple_name: String,
    pub package: String,
    pub kind: DeclKind,
    pub enclosing: Option<DeclId>,
    pub type_params: Vec<String>,
    /// Superclass first, then implemented or extended interfaces.
    pub supertypes: Vec<TypeReference>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    /// Enum constant names in declaration order.
    pub constants: Vec<String>,
    pub markers: Vec<Marker>,
    /// Cleaned doc comment.
    pub doc: Option<String>,
    pub location: DeclLocation,
    /// Fingerprint of the signature, used to tell real duplicates from copies.
    pub(crate) signature: String,
}

impl Declaration {
    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        has_marker(&self.markers, kind)
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        find_marker(&self.markers, kind)
    }

    pub fn is_enum(&self) -> bool {
        self.kind == DeclKind::Enum
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DeclKind::Interface
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A public method with the given name and parameter count.
    pub fn method(&self, name: &str, params: usize) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.params.len() == params && !m.is_static)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeReference,
    pub is_static: bool,
    pub is_public: bool,
    pub markers: Vec<Marker>,
    pub doc: Option<String>,
    pub default: Option<Initializer>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// `None` for `void`.
    pub return_type: Option<TypeReference>,
    pub params: Vec<TypeReference>,
    pub is_static: bool,
    pub is_public: bool,
    pub is_abstract: bool,
    pub markers: Vec<Marker>,
    pub doc: Option<String>,
    pub line: u32,
}
