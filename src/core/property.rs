//! Property items, groups and value hints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{ResolvedType, TypeKind};

/// One leaf configuration entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyItem {
    /// Full dotted name, prefix included.
    pub name: String,

    /// Canonical type string. Supplementary documents may leave it out.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyKind>,

    /// Holder type that declares the member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<Deprecation>,

    /// JSON schema of the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl PropertyItem {
    /// A bare item with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        PropertyItem {
            name: name.into(),
            type_name: None,
            kind: None,
            source_type: None,
            description: None,
            default_value: None,
            deprecation: None,
            schema: None,
        }
    }

    /// An item typed from a resolved type.
    pub fn typed(name: impl Into<String>, ty: &ResolvedType) -> Self {
        PropertyItem {
            type_name: Some(ty.render()),
            kind: Some(PropertyKind::classify(ty)),
            ..PropertyItem::named(name)
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_deprecation(mut self, deprecation: Deprecation) -> Self {
        self.deprecation = Some(deprecation);
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }
}

/// Deprecation severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeprecationLevel {
    /// Still bound, but should be migrated.
    #[default]
    Warning,
    /// No longer bound.
    Error,
}

/// Deprecation block of a property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    #[serde(default)]
    pub level: DeprecationLevel,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Full name of the property to use instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

/// A group of properties contributed by one holder type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Legal values of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueHint {
    pub name: String,
    #[serde(default)]
    pub values: Vec<HintValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Coarse value category of a property, derived from its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Duration,
    TimeZone,
    Date,
    DateTime,
    Uri,
    InternetAddress,
    DataSize,
    MimeType,
    Resource,
    Charset,
    Locale,
    Enum,
    Collection,
    Map,
}

const KIND_TABLE: &[(PropertyKind, &[&str])] = &[
    (
        PropertyKind::Number,
        &[
            "byte",
            "short",
            "int",
            "long",
            "float",
            "double",
            "java.lang.Byte",
            "java.lang.Short",
            "java.lang.Integer",
            "java.lang.Long",
            "java.lang.Float",
            "java.lang.Double",
            "java.lang.Number",
            "java.math.BigDecimal",
            "java.math.BigInteger",
        ],
    ),
    (PropertyKind::Boolean, &["boolean", "java.lang.Boolean"]),
    (PropertyKind::Duration, &["java.time.Duration"]),
    (PropertyKind::TimeZone, &["java.util.TimeZone", "java.time.ZoneId"]),
    (PropertyKind::Date, &["java.time.LocalDate"]),
    (
        PropertyKind::DateTime,
        &[
            "java.util.Date",
            "java.time.Instant",
            "java.time.LocalDateTime",
            "java.time.ZonedDateTime",
            "java.time.OffsetDateTime",
        ],
    ),
    (PropertyKind::Uri, &["java.net.URI", "java.net.URL"]),
    (PropertyKind::InternetAddress, &["java.net.InetAddress"]),
    (
        PropertyKind::DataSize,
        &["org.springframework.util.unit.DataSize"],
    ),
    (PropertyKind::MimeType, &["org.springframework.util.MimeType"]),
    (
        PropertyKind::Resource,
        &["org.springframework.core.io.Resource"],
    ),
    (PropertyKind::Charset, &["java.nio.charset.Charset"]),
    (PropertyKind::Locale, &["java.util.Locale"]),
];

impl PropertyKind {
    /// Derive the kind of a resolved type. Unknown types are strings.
    pub fn classify(ty: &ResolvedType) -> PropertyKind {
        match ty.kind {
            TypeKind::Enum(_) => return PropertyKind::Enum,
            TypeKind::CollectionOf(_) => return PropertyKind::Collection,
            TypeKind::MapOf(..) => return PropertyKind::Map,
            _ => {}
        }

        KIND_TABLE
            .iter()
            .find(|(_, names)| names.contains(&ty.name.as_str()))
            .map(|(kind, _)| *kind)
            .unwrap_or(PropertyKind::String)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyKind::String => "string",
            PropertyKind::Number => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Duration => "duration",
            PropertyKind::TimeZone => "time-zone",
            PropertyKind::Date => "date",
            PropertyKind::DateTime => "date-time",
            PropertyKind::Uri => "uri",
            PropertyKind::InternetAddress => "internet-address",
            PropertyKind::DataSize => "data-size",
            PropertyKind::MimeType => "mime-type",
            PropertyKind::Resource => "resource",
            PropertyKind::Charset => "charset",
            PropertyKind::Locale => "locale",
            PropertyKind::Enum => "enum",
            PropertyKind::Collection => "collection",
            PropertyKind::Map => "map",
        };
        write!(f, "{}", s)
    }
}
