//! Declaration-level syntax tree.
//!
//! Only what metadata extraction needs is kept: declarations, their
//! signatures, annotations, doc comments and field initializers. Method and
//! initializer bodies are skipped by the parser.

use std::path::PathBuf;

use crate::core::types::TypeReference;

/// One parsed `.java` file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported name without the trailing `.*`.
    pub path: String,
    pub wildcard: bool,
    pub is_static: bool,
}

impl Import {
    /// Last segment of a single-type import.
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
            DeclKind::Enum => "enum",
            DeclKind::Record => "record",
            DeclKind::Annotation => "annotation",
        }
    }

    pub fn parse(s: &str) -> Option<DeclKind> {
        match s {
            "class" => Some(DeclKind::Class),
            "interface" => Some(DeclKind::Interface),
            "enum" => Some(DeclKind::Enum),
            "record" => Some(DeclKind::Record),
            "annotation" => Some(DeclKind::Annotation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_default: bool,
}

impl Modifiers {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// An annotation as written.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Name as written, possibly qualified.
    pub name: String,
    /// Named arguments; a single unnamed argument is keyed `value`.
    pub args: Vec<(String, AnnotationValue)>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Str(String),
    Literal(String),
    Name(String),
    Array(Vec<AnnotationValue>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub type_params: Vec<String>,
    /// `extends` clause: one class for classes, any number for interfaces.
    pub extends: Vec<TypeReference>,
    pub implements: Vec<TypeReference>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub constants: Vec<EnumConstant>,
    /// Record components.
    pub components: Vec<Param>,
    /// Member type declarations.
    pub members: Vec<TypeDecl>,
    pub line: u32,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: DeclKind, line: u32) -> Self {
        TypeDecl {
            name: name.into(),
            kind,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            doc: None,
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
            components: Vec::new(),
            members: Vec::new(),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeReference,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub initializer: Option<Initializer>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    /// `None` for `void`.
    pub return_type: Option<TypeReference>,
    pub params: Vec<Param>,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub doc: Option<String>,
    pub has_body: bool,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeReference,
    pub annotations: Vec<Annotation>,
}

/// A field initializer, reduced to what can be known without evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Literal(Literal),
    /// A (possibly qualified) name, e.g. an enum constant `Mode.FAST`.
    Name(String),
    /// Anything else: calls, object creation, arithmetic.
    Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Null,
}
