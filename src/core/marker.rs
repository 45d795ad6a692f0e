//! Recognized annotation markers.
//!
//! Markers are identified by fully-qualified annotation name. Names are
//! classified into a [`MarkerKind`] once, while the index is built, so later
//! stages match on the kind instead of comparing names.

use std::collections::BTreeMap;

/// The closed set of marker kinds the extractor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerKind {
    /// Marks a configuration-holder root and carries its prefix.
    Root,
    /// Marks a member (or type) as a nested property group.
    NestedGroup,
    /// Marks a member or holder as deprecated.
    Deprecated,
    /// Generates accessors for the annotated class or field.
    Accessor,
}

/// An annotation argument value, as far as static analysis can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerValue {
    /// A string literal, or a concatenation of string literals.
    Str(String),
    /// Any other literal, kept as written.
    Literal(String),
    /// A (possibly qualified) name such as a constant reference.
    Name(String),
    /// An array initializer.
    List(Vec<MarkerValue>),
    /// An expression the extractor does not evaluate.
    Unknown,
}

impl MarkerValue {
    /// The value as a string, if it is a string literal or a one-element list of one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MarkerValue::Str(s) => Some(s),
            MarkerValue::List(items) if items.len() == 1 => items[0].as_str(),
            _ => None,
        }
    }
}

/// A recognized annotation attached to a declaration or member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Fully-qualified annotation name that matched.
    pub annotation: String,
    /// Named arguments; a single unnamed argument is stored as `value`.
    pub args: BTreeMap<String, MarkerValue>,
}

impl Marker {
    pub fn new(kind: MarkerKind, annotation: impl Into<String>) -> Self {
        Marker {
            kind,
            annotation: annotation.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: MarkerValue) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// A string-valued argument.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(MarkerValue::as_str)
    }

    /// The property prefix declared by a root marker (`prefix`, else `value`).
    pub fn prefix(&self) -> Option<&str> {
        self.str_arg("prefix")
            .or_else(|| self.str_arg("value"))
            .filter(|p| !p.is_empty())
    }
}

/// Find the first marker of `kind`.
pub fn find_marker(markers: &[Marker], kind: MarkerKind) -> Option<&Marker> {
    markers.iter().find(|m| m.kind == kind)
}

/// Whether any marker of `kind` is present.
pub fn has_marker(markers: &[Marker], kind: MarkerKind) -> bool {
    find_marker(markers, kind).is_some()
}

/// Recognized marker names, by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    /// Configuration-holder root annotations.
    pub root: Vec<String>,
    /// Nested property group annotations.
    pub nested: Vec<String>,
    /// Deprecation annotations.
    pub deprecated: Vec<String>,
    /// Accessor-generating annotations.
    pub accessors: Vec<String>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        MarkerSet {
            root: vec!["org.springframework.boot.context.properties.ConfigurationProperties".into()],
            nested: vec![
                "org.springframework.boot.context.properties.NestedConfigurationProperty".into(),
            ],
            deprecated: vec![
                "org.springframework.boot.context.properties.DeprecatedConfigurationProperty"
                    .into(),
                "java.lang.Deprecated".into(),
            ],
            accessors: vec![
                "lombok.Data".into(),
                "lombok.Getter".into(),
                "lombok.Value".into(),
            ],
        }
    }
}

impl MarkerSet {
    /// Classify a fully-qualified annotation name.
    pub fn classify(&self, qualified_name: &str) -> Option<MarkerKind> {
        let matches = |names: &[String]| names.iter().any(|n| n == qualified_name);

        if matches(&self.root) {
            Some(MarkerKind::Root)
        } else if matches(&self.nested) {
            Some(MarkerKind::NestedGroup)
        } else if matches(&self.deprecated) {
            Some(MarkerKind::Deprecated)
        } else if matches(&self.accessors) {
            Some(MarkerKind::Accessor)
        } else {
            None
        }
    }
}
