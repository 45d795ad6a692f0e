//! Type references and resolved types.
//!
//! A [`TypeReference`] is purely descriptive: it records a type the way it
//! textually appears in source. The resolver turns it into a
//! [`ResolvedType`], which carries a canonical qualified name, a kind tag and,
//! for declarations known to the index, a [`DeclId`] back-reference.

use std::collections::HashMap;
use std::fmt;

/// Index of a declaration in the source index arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Java primitive type keywords.
pub const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Canonical name of the root object type.
pub const OBJECT: &str = "java.lang.Object";

/// A reference to a named type as written in source.
///
/// `Map<String, List<Foo>>[]` is `name = "Map"`, two `args`, `array_dims = 1`.
/// Wildcards are recorded by their bound; an unbounded `?` has the name `"?"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub name: String,
    pub args: Vec<TypeReference>,
    pub array_dims: u8,
}

impl TypeReference {
    /// A reference without type arguments.
    pub fn simple(name: impl Into<String>) -> Self {
        TypeReference {
            name: name.into(),
            args: Vec::new(),
            array_dims: 0,
        }
    }

    /// A parameterized reference.
    pub fn generic(name: impl Into<String>, args: Vec<TypeReference>) -> Self {
        TypeReference {
            name: name.into(),
            args,
            array_dims: 0,
        }
    }

    /// Wrap this reference in `dims` array dimensions.
    pub fn with_array_dims(mut self, dims: u8) -> Self {
        self.array_dims = self.array_dims.saturating_add(dims);
        self
    }

    /// Whether the reference names a primitive keyword.
    pub fn is_primitive(&self) -> bool {
        self.array_dims == 0 && PRIMITIVES.contains(&self.name.as_str())
    }

    /// Whether the reference is an unbounded wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.name == "?"
    }

    /// Whether the name is written qualified (`a.b.C` or `Outer.Inner`).
    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }

    /// First segment of the written name.
    pub fn head(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    /// The same reference with one array dimension removed.
    pub fn component(&self) -> Option<TypeReference> {
        if self.array_dims == 0 {
            return None;
        }
        let mut component = self.clone();
        component.array_dims -= 1;
        Some(component)
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

/// Classification of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A primitive keyword such as `int`.
    Primitive,
    /// An enum declaration known to the index.
    Enum(DeclId),
    /// A configuration holder that the walker recurses into.
    Holder(DeclId),
    /// A collection (or array) of the element type.
    CollectionOf(Box<ResolvedType>),
    /// A map from key type to value type.
    MapOf(Box<ResolvedType>, Box<ResolvedType>),
    /// Any other type, with its declaration when the index knows it.
    Opaque(Option<DeclId>),
    /// A type variable awaiting substitution.
    Variable,
}

/// The outcome of resolving a [`TypeReference`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedType {
    /// Canonical qualified name of the raw type, or the rendered array type.
    pub name: String,
    /// Resolved type arguments as written at the reference site.
    pub args: Vec<ResolvedType>,
    pub kind: TypeKind,
}

impl ResolvedType {
    pub fn new(name: impl Into<String>, args: Vec<ResolvedType>, kind: TypeKind) -> Self {
        ResolvedType {
            name: name.into(),
            args,
            kind,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), TypeKind::Primitive)
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), TypeKind::Opaque(None))
    }

    pub fn object() -> Self {
        Self::opaque(OBJECT)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), TypeKind::Variable)
    }

    /// An array of `element`, classified as a collection of it.
    pub fn array_of(element: ResolvedType) -> Self {
        let name = format!("{}[]", element.render());
        Self::new(name, Vec::new(), TypeKind::CollectionOf(Box::new(element)))
    }

    /// Whether this type is an array rather than a declared collection type.
    pub fn is_array(&self) -> bool {
        self.name.ends_with("[]")
    }

    /// The declaration backing this type, if the index knows it.
    pub fn decl(&self) -> Option<DeclId> {
        match self.kind {
            TypeKind::Enum(id) | TypeKind::Holder(id) => Some(id),
            TypeKind::Opaque(id) => id,
            _ => None,
        }
    }

    pub fn is_holder(&self) -> bool {
        matches!(self.kind, TypeKind::Holder(_))
    }

    /// Render the canonical type string, e.g. `java.util.Map<java.lang.String,java.lang.Integer>`.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.args.iter().map(ResolvedType::render).collect();
        format!("{}<{}>", self.name, args.join(","))
    }

    /// Replace type variables using `bindings`.
    ///
    /// Variables without a binding erase to `java.lang.Object`.
    pub fn substitute(&self, bindings: &HashMap<String, ResolvedType>) -> ResolvedType {
        if bindings.is_empty() && !self.mentions_variable() {
            return self.clone();
        }

        match &self.kind {
            TypeKind::Variable => bindings
                .get(&self.name)
                .cloned()
                .unwrap_or_else(ResolvedType::object),
            TypeKind::CollectionOf(element) if self.is_array() => {
                ResolvedType::array_of(element.substitute(bindings))
            }
            TypeKind::CollectionOf(element) => ResolvedType::new(
                self.name.clone(),
                self.substitute_args(bindings),
                TypeKind::CollectionOf(Box::new(element.substitute(bindings))),
            ),
            TypeKind::MapOf(key, value) => ResolvedType::new(
                self.name.clone(),
                self.substitute_args(bindings),
                TypeKind::MapOf(
                    Box::new(key.substitute(bindings)),
                    Box::new(value.substitute(bindings)),
                ),
            ),
            kind => ResolvedType::new(
                self.name.clone(),
                self.substitute_args(bindings),
                kind.clone(),
            ),
        }
    }

    fn substitute_args(&self, bindings: &HashMap<String, ResolvedType>) -> Vec<ResolvedType> {
        self.args.iter().map(|a| a.substitute(bindings)).collect()
    }

    fn mentions_variable(&self) -> bool {
        match &self.kind {
            TypeKind::Variable => true,
            TypeKind::CollectionOf(e) => e.mentions_variable(),
            TypeKind::MapOf(k, v) => k.mentions_variable() || v.mentions_variable(),
            _ => self.args.iter().any(ResolvedType::mentions_variable),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
