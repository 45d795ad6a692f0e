//! JSON schema of a property value.
//!
//! Scalars map to a schema type and an optional format. Enums list their
//! constants, sorted. Collections become arrays and maps become objects keyed
//! by the key schema. Any other indexed class is described by its exposed
//! members; a class already being described becomes a plain string.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::core::marker::{has_marker, MarkerKind};
use crate::core::types::{DeclId, ResolvedType, TypeKind};
use crate::resolver::SymbolResolver;
use crate::walker::members;

/// (types, schema type, format)
const SCALARS: &[(&[&str], &str, Option<&str>)] = &[
    (
        &[
            "java.lang.String",
            "java.lang.Character",
            "char",
            "java.lang.CharSequence",
            "java.lang.Byte",
            "byte",
            "java.net.InetAddress",
            "java.lang.Class",
        ],
        "string",
        None,
    ),
    (
        &["java.net.URI", "java.net.URL", "java.io.File", "java.nio.file.Path"],
        "string",
        Some("uri"),
    ),
    (&["java.time.LocalDate"], "string", Some("date")),
    (
        &[
            "java.time.LocalDateTime",
            "java.time.ZonedDateTime",
            "java.time.OffsetDateTime",
            "java.time.Instant",
            "java.util.Date",
            "java.util.Calendar",
        ],
        "string",
        Some("date-time"),
    ),
    (&["java.time.LocalTime", "java.time.OffsetTime"], "string", Some("time")),
    (&["java.time.Duration", "java.time.Period"], "string", Some("duration")),
    (&["java.util.UUID"], "string", Some("uuid")),
    (&["java.nio.charset.Charset"], "string", Some("charset")),
    (&["java.time.ZoneId", "java.util.TimeZone"], "string", Some("time-zone")),
    (&["java.util.Locale"], "string", Some("language")),
    (&["org.springframework.core.io.Resource"], "string", Some("resource")),
    (&["org.springframework.util.MimeType"], "string", Some("mime-type")),
    (&["org.springframework.util.unit.DataSize"], "string", Some("data-size")),
    (&["java.net.Inet4Address"], "string", Some("ipv4")),
    (&["java.net.Inet6Address"], "string", Some("ipv6")),
    (&["java.lang.Boolean", "boolean"], "boolean", None),
    (&["java.lang.Integer", "int"], "integer", Some("int32")),
    (&["java.lang.Long", "long"], "integer", Some("int64")),
    (&["java.math.BigInteger", "java.lang.Short", "short"], "integer", None),
    (&["java.lang.Double", "double"], "number", Some("double")),
    (&["java.lang.Float", "float"], "number", Some("float")),
    (&["java.math.BigDecimal", "java.lang.Number"], "number", None),
];

const OPTIONAL: &str = "java.util.Optional";
const OBJECT: &str = "java.lang.Object";

/// Schema for values of `ty`.
pub fn schema_for(resolver: &SymbolResolver<'_>, ty: &ResolvedType) -> Value {
    SchemaBuilder {
        resolver,
        visiting: Vec::new(),
    }
    .build(ty)
}

/// Schema of a scalar type name, if it is one.
pub fn scalar_schema(type_name: &str) -> Option<Value> {
    SCALARS
        .iter()
        .find(|(names, _, _)| names.contains(&type_name))
        .map(|(_, schema_type, format)| match format {
            Some(format) => json!({ "type": schema_type, "format": format }),
            None => json!({ "type": schema_type }),
        })
}

struct SchemaBuilder<'r, 'a> {
    resolver: &'r SymbolResolver<'a>,
    visiting: Vec<DeclId>,
}

impl SchemaBuilder<'_, '_> {
    fn build(&mut self, ty: &ResolvedType) -> Value {
        if let Some(schema) = scalar_schema(&ty.name) {
            return schema;
        }

        match &ty.kind {
            TypeKind::Enum(id) => {
                let mut values = self.resolver.index().decl(*id).constants.clone();
                values.sort();
                json!({ "type": "string", "enum": values })
            }
            TypeKind::CollectionOf(element) => json!({ "type": "array", "items": self.build(element) }),
            TypeKind::MapOf(key, value) => json!({
                "type": "object",
                "propertyNames": self.build(key),
                "additionalProperties": self.build(value),
            }),
            _ if ty.name == OPTIONAL => match ty.args.first() {
                Some(inner) => self.build(inner),
                None => json!({ "type": "string" }),
            },
            TypeKind::Holder(id) | TypeKind::Opaque(Some(id)) => self.object(*id, ty),
            _ if ty.name == OBJECT => json!({ "type": "object" }),
            _ => json!({ "type": "string" }),
        }
    }

    /// An object schema listing the exposed members of `id`.
    fn object(&mut self, id: DeclId, ty: &ResolvedType) -> Value {
        if self.visiting.contains(&id) {
            return json!({ "type": "string" });
        }

        let decl = self.resolver.index().decl(id);
        let bindings = members::bindings_for(decl, ty);
        let members = match members::collect_members(self.resolver, id, &bindings) {
            Ok(members) => members,
            Err(err) => {
                debug!("no member schema for {}: {}", decl.qualified_name, err);
                return json!({ "type": "object" });
            }
        };

        self.visiting.push(id);
        let mut properties = Map::new();
        let mut required = Vec::new();
        for member in members {
            let mut schema = match self.resolver.resolve(&member.ty, member.declared_in) {
                Ok(resolved) => self.build(&resolved.substitute(&member.bindings)),
                Err(err) => {
                    debug!("no schema for {}.{}: {}", decl.qualified_name, member.name, err);
                    json!({ "type": "string" })
                }
            };
            if has_marker(&member.markers, MarkerKind::Deprecated) {
                schema["deprecated"] = Value::Bool(true);
            }
            if member.ty.is_primitive() {
                required.push(Value::String(member.name.clone()));
            }
            properties.insert(member.name, schema);
        }
        self.visiting.pop();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::index_sources;
    use tempfile::TempDir;

    fn field_schema(source: &str, owner: &str, field: &str) -> Value {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(tmp.path(), &[("com/acme/Sample.java", source)]);
        let resolver = SymbolResolver::new(&index);
        let id = index.lookup(owner)[0];
        let decl = index.decl(id);
        let ty = &decl.field(field).unwrap().ty;
        let resolved = resolver.resolve(ty, id).unwrap();
        schema_for(&resolver, &resolved)
    }

    #[test]
    fn test_scalar_formats() {
        assert_eq!(scalar_schema("int"), Some(json!({"type": "integer", "format": "int32"})));
        assert_eq!(
            scalar_schema("java.lang.Long"),
            Some(json!({"type": "integer", "format": "int64"}))
        );
        assert_eq!(scalar_schema("short"), Some(json!({"type": "integer"})));
        assert_eq!(
            scalar_schema("double"),
            Some(json!({"type": "number", "format": "double"}))
        );
        assert_eq!(scalar_schema("java.math.BigDecimal"), Some(json!({"type": "number"})));
        assert_eq!(scalar_schema("boolean"), Some(json!({"type": "boolean"})));
        assert_eq!(scalar_schema("java.lang.String"), Some(json!({"type": "string"})));
        assert_eq!(
            scalar_schema("java.net.URI"),
            Some(json!({"type": "string", "format": "uri"}))
        );
        assert_eq!(
            scalar_schema("java.time.Instant"),
            Some(json!({"type": "string", "format": "date-time"}))
        );
        assert_eq!(
            scalar_schema("java.time.Duration"),
            Some(json!({"type": "string", "format": "duration"}))
        );
        assert_eq!(
            scalar_schema("java.util.UUID"),
            Some(json!({"type": "string", "format": "uuid"}))
        );
        assert_eq!(
            scalar_schema("java.net.Inet6Address"),
            Some(json!({"type": "string", "format": "ipv6"}))
        );
        assert_eq!(
            scalar_schema("org.springframework.util.unit.DataSize"),
            Some(json!({"type": "string", "format": "data-size"}))
        );
        assert_eq!(scalar_schema("com.acme.Unknown"), None);
    }

    #[test]
    fn test_enum_values_are_sorted() {
        let schema = field_schema(
            "package com.acme;\npublic class Sample {\n    public enum Mode { STRICT, LENIENT, AUTO }\n    Mode mode;\n}\n",
            "com.acme.Sample",
            "mode",
        );
        assert_eq!(schema, json!({"type": "string", "enum": ["AUTO", "LENIENT", "STRICT"]}));
    }

    #[test]
    fn test_collections_and_maps() {
        let source = r#"package com.acme;
import java.util.List;
import java.util.Map;
import java.util.Optional;
public class Sample {
    public enum Mode { ON, OFF }
    List<Mode> modes;
    Map<String, Integer> limits;
    Optional<Long> budget;
}
"#;
        assert_eq!(
            field_schema(source, "com.acme.Sample", "modes"),
            json!({"type": "array", "items": {"type": "string", "enum": ["OFF", "ON"]}})
        );
        assert_eq!(
            field_schema(source, "com.acme.Sample", "limits"),
            json!({
                "type": "object",
                "propertyNames": {"type": "string"},
                "additionalProperties": {"type": "integer", "format": "int32"}
            })
        );
        assert_eq!(
            field_schema(source, "com.acme.Sample", "budget"),
            json!({"type": "integer", "format": "int64"})
        );
    }

    #[test]
    fn test_plain_class_lists_members() {
        let source = r#"package com.acme;
public class Sample {
    public static class Endpoint {
        public String host;
        public int port;
        @Deprecated
        public Endpoint fallback;
    }
    Endpoint endpoint;
}
"#;
        assert_eq!(
            field_schema(source, "com.acme.Sample", "endpoint"),
            json!({
                "type": "object",
                "properties": {
                    "host": {"type": "string"},
                    "port": {"type": "integer", "format": "int32"},
                    "fallback": {"type": "string", "deprecated": true}
                },
                "required": ["port"]
            })
        );
    }
}
