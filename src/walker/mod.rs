//! Property walking.
//!
//! [`PropertyWalker::walk`] returns a lazy, depth-first [`Walk`] over one
//! root holder. The walk keeps an explicit stack of frames, one per holder
//! on the active path; nothing is shared between walks, so every root can
//! be walked again, or on another thread, independently.
//!
//! For each exposed member the resolved type decides the shape:
//!
//! | Type                         | Emitted as                         |
//! |------------------------------|------------------------------------|
//! | holder                       | group `p.m`, then `p.m.sub`        |
//! | collection of holder         | `p.m[].sub`                        |
//! | map with holder values       | `p.m.<key>.sub`                    |
//! | anything else                | property `p.m`                     |
//!
//! A holder type already on the active path is a [`WalkError::CyclicHolder`].

pub mod defaults;
pub mod errors;
pub mod members;
pub mod naming;
pub mod schema;

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::core::marker::{has_marker, Marker, MarkerKind, MarkerValue};
use crate::core::property::{
    Deprecation, DeprecationLevel, HintValue, PropertyGroup, PropertyItem, ValueHint,
};
use crate::core::types::{DeclId, ResolvedType, TypeKind};
use crate::index::SourceIndex;
use crate::resolver::SymbolResolver;

pub use errors::WalkError;
pub use members::Member;
pub use naming::NameStyle;

/// Placeholder segment for map keys.
pub const MAP_KEY: &str = "<key>";

/// Suffix of collection element segments.
pub const INDEX: &str = "[]";

/// One step of a walk.
#[derive(Debug, Clone, PartialEq)]
pub enum WalkEvent {
    /// A root or nested holder was entered.
    Group(PropertyGroup),
    Property(PropertyItem),
    /// Legal values of the preceding property (or of its map keys).
    Hint(ValueHint),
}

/// Walks configuration holders.
#[derive(Debug, Clone, Copy)]
pub struct PropertyWalker<'r, 'a> {
    resolver: &'r SymbolResolver<'a>,
    naming: NameStyle,
}

impl<'r, 'a> PropertyWalker<'r, 'a> {
    pub fn new(resolver: &'r SymbolResolver<'a>) -> Self {
        PropertyWalker {
            resolver,
            naming: NameStyle::default(),
        }
    }

    pub fn with_naming(mut self, naming: NameStyle) -> Self {
        self.naming = naming;
        self
    }

    pub fn resolver(&self) -> &'r SymbolResolver<'a> {
        self.resolver
    }

    pub fn naming(&self) -> NameStyle {
        self.naming
    }

    /// Start a walk of `root`. Nothing is resolved until the walk is polled.
    pub fn walk(&self, root: DeclId) -> Walk<'r, 'a> {
        Walk {
            resolver: self.resolver,
            naming: self.naming,
            root,
            started: false,
            stack: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// All properties of `root`, or the first error.
    pub fn properties(&self, root: DeclId) -> Result<Vec<PropertyItem>, WalkError> {
        let mut items = Vec::new();
        for event in self.walk(root) {
            if let WalkEvent::Property(item) = event? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

/// A holder on the active path.
#[derive(Debug)]
struct Frame {
    qualified_name: String,
    prefix: String,
    members: VecDeque<Member>,
    deprecation: Option<Deprecation>,
}

/// Lazy depth-first walk of one root; see [`PropertyWalker::walk`].
///
/// After yielding an error the walk is finished.
#[derive(Debug)]
pub struct Walk<'r, 'a> {
    resolver: &'r SymbolResolver<'a>,
    naming: NameStyle,
    root: DeclId,
    started: bool,
    stack: Vec<Frame>,
    pending: VecDeque<WalkEvent>,
    done: bool,
}

impl Iterator for Walk<'_, '_> {
    type Item = Result<WalkEvent, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }

            let step = if self.started {
                self.step()
            } else {
                self.started = true;
                self.enter_root().map(|()| true)
            };

            match step {
                Ok(true) => {}
                Ok(false) => self.done = true,
                Err(err) => {
                    self.done = true;
                    self.stack.clear();
                    self.pending.clear();
                    return Some(Err(err));
                }
            }
        }
    }
}

impl Walk<'_, '_> {
    fn index(&self) -> &SourceIndex {
        self.resolver.index()
    }

    fn enter_root(&mut self) -> Result<(), WalkError> {
        let decl = self.index().decl(self.root);
        let prefix = decl
            .marker(MarkerKind::Root)
            .and_then(Marker::prefix)
            .unwrap_or_default()
            .to_string();
        let qualified_name = decl.qualified_name.clone();
        let description = decl.doc.clone();
        let deprecation = deprecation_of(&decl.markers);
        debug!("walking `{}` under prefix `{}`", qualified_name, prefix);

        if !prefix.is_empty() {
            self.pending.push_back(WalkEvent::Group(PropertyGroup {
                name: prefix.clone(),
                type_name: Some(qualified_name.clone()),
                source_type: Some(qualified_name),
                description,
            }));
        }

        self.push_frame(self.root, prefix, HashMap::new(), deprecation)
    }

    /// Visit the next member of the innermost frame; `false` once the stack is empty.
    fn step(&mut self) -> Result<bool, WalkError> {
        let Some(frame) = self.stack.last_mut() else {
            return Ok(false);
        };
        match frame.members.pop_front() {
            Some(member) => self.visit(member)?,
            None => {
                self.stack.pop();
            }
        }
        Ok(true)
    }

    fn visit(&mut self, member: Member) -> Result<(), WalkError> {
        let Some(frame) = self.stack.last() else {
            return Ok(());
        };
        let prefix = frame.prefix.clone();
        let holder_name = frame.qualified_name.clone();
        let inherited = frame.deprecation.clone();

        let ty = self
            .resolver
            .resolve(&member.ty, member.declared_in)?
            .substitute(&member.bindings);
        let name = join(&prefix, &self.naming.apply(&member.name));
        let own = deprecation_of(&member.markers);
        let forced = has_marker(&member.markers, MarkerKind::NestedGroup);

        if let Some(nested) = self.nested_holder(&ty, forced) {
            let deprecation = own
                .or_else(|| deprecation_of(&self.index().decl(nested).markers))
                .or(inherited);
            self.pending.push_back(WalkEvent::Group(PropertyGroup {
                name: name.clone(),
                type_name: Some(ty.render()),
                source_type: Some(holder_name),
                description: member.doc.clone(),
            }));
            return self.enter(&member, nested, &ty, name, deprecation);
        }

        match &ty.kind {
            TypeKind::CollectionOf(element) => {
                if let Some(nested) = self.nested_holder(element, forced) {
                    let deprecation = own.or(inherited);
                    let prefix = format!("{}{}", name, INDEX);
                    return self.enter(&member, nested, element, prefix, deprecation);
                }
            }
            TypeKind::MapOf(key, value) => {
                if let Some(nested) = self.nested_holder(value, forced) {
                    if let Some(hint) = enum_hint(self.index(), format!("{}.keys", name), key) {
                        self.pending.push_back(WalkEvent::Hint(hint));
                    }
                    let deprecation = own.or(inherited);
                    let prefix = join(&name, MAP_KEY);
                    return self.enter(&member, nested, value, prefix, deprecation);
                }
            }
            _ => {}
        }

        let index = self.index();
        let mut item = PropertyItem::typed(name.clone(), &ty);
        item.source_type = Some(holder_name);
        item.description = member.doc.clone();
        item.default_value = member
            .default
            .as_ref()
            .and_then(|init| defaults::default_value(init, &ty, member.declared_in, index));
        item.deprecation = own.or(inherited);
        item.schema = Some(schema::schema_for(self.resolver, &ty));

        let hint = leaf_hint(index, &name, &ty);
        self.pending.push_back(WalkEvent::Property(item));
        if let Some(hint) = hint {
            self.pending.push_back(WalkEvent::Hint(hint));
        }
        Ok(())
    }

    /// The holder declaration `ty` is walked into, if any.
    ///
    /// `forced` is set when the member carries a nested-group marker; any
    /// indexed class is then treated as a holder.
    fn nested_holder(&self, ty: &ResolvedType, forced: bool) -> Option<DeclId> {
        match ty.kind {
            TypeKind::Holder(id) => Some(id),
            TypeKind::Opaque(Some(id)) if forced && !self.index().decl(id).is_interface() => Some(id),
            _ => None,
        }
    }

    fn enter(
        &mut self,
        member: &Member,
        holder: DeclId,
        ty: &ResolvedType,
        prefix: String,
        deprecation: Option<Deprecation>,
    ) -> Result<(), WalkError> {
        let qualified_name = &self.index().decl(holder).qualified_name;

        if let Some(pos) = self
            .stack
            .iter()
            .position(|f| &f.qualified_name == qualified_name)
        {
            let mut cycle: Vec<String> = self.stack[pos..]
                .iter()
                .map(|f| f.qualified_name.clone())
                .collect();
            cycle.push(qualified_name.clone());

            let owner = self.index().decl(member.declared_in);
            return Err(WalkError::CyclicHolder {
                root: self.index().decl(self.root).qualified_name.clone(),
                cycle,
                property: prefix,
                location: format!("{}:{}", owner.location.path.display(), member.line),
            });
        }

        let bindings = members::bindings_for(self.index().decl(holder), ty);
        self.push_frame(holder, prefix, bindings, deprecation)
    }

    fn push_frame(
        &mut self,
        holder: DeclId,
        prefix: String,
        bindings: HashMap<String, ResolvedType>,
        deprecation: Option<Deprecation>,
    ) -> Result<(), WalkError> {
        let members = members::collect_members(self.resolver, holder, &bindings)?;
        let qualified_name = self.index().decl(holder).qualified_name.clone();
        self.stack.push(Frame {
            qualified_name,
            prefix,
            members: members.into(),
            deprecation,
        });
        Ok(())
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Merge every deprecation marker into one block; `None` when there is none.
fn deprecation_of(markers: &[Marker]) -> Option<Deprecation> {
    let mut found = markers
        .iter()
        .filter(|m| m.kind == MarkerKind::Deprecated)
        .peekable();
    found.peek()?;

    let mut deprecation = Deprecation::default();
    for marker in found {
        let arg = |key: &str| marker.str_arg(key).filter(|s| !s.is_empty()).map(String::from);
        deprecation.reason = deprecation.reason.or_else(|| arg("reason"));
        deprecation.replacement = deprecation.replacement.or_else(|| arg("replacement"));
        deprecation.since = deprecation.since.or_else(|| arg("since"));

        let error_level = match marker.args.get("level") {
            Some(MarkerValue::Name(level)) => level.ends_with("ERROR"),
            Some(MarkerValue::Str(level)) => level.eq_ignore_ascii_case("error"),
            _ => false,
        };
        if error_level {
            deprecation.level = DeprecationLevel::Error;
        }
    }
    Some(deprecation)
}

fn leaf_hint(index: &SourceIndex, name: &str, ty: &ResolvedType) -> Option<ValueHint> {
    match &ty.kind {
        TypeKind::Enum(_) => enum_hint(index, name.to_string(), ty),
        TypeKind::CollectionOf(element) => enum_hint(index, name.to_string(), element),
        TypeKind::MapOf(key, _) => enum_hint(index, format!("{}.keys", name), key),
        _ => None,
    }
}

fn enum_hint(index: &SourceIndex, name: String, ty: &ResolvedType) -> Option<ValueHint> {
    let TypeKind::Enum(id) = ty.kind else {
        return None;
    };
    let values = index
        .decl(id)
        .constants
        .iter()
        .map(|c| HintValue {
            value: c.clone(),
            description: None,
        })
        .collect();
    Some(ValueHint { name, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::{index_sources, sources};
    use crate::util::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn events(index: &SourceIndex, root: &str, naming: NameStyle) -> Vec<WalkEvent> {
        let resolver = SymbolResolver::new(index);
        let walker = PropertyWalker::new(&resolver).with_naming(naming);
        walker
            .walk(index.lookup(root)[0])
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn property_names(events: &[WalkEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                WalkEvent::Property(item) => Some(item.name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_root_with_nested_deprecated_property() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(tmp.path(), &[("com/acme/RootProperties.java", sources::RETRY_PROPERTIES)]);
        let resolver = SymbolResolver::new(&index);
        let walker = PropertyWalker::new(&resolver);

        let items = walker.properties(index.lookup("com.acme.RootProperties")[0]).unwrap();
        assert_eq!(items.len(), 2);

        let timeout = &items[0];
        assert_eq!(timeout.name, "root.timeout");
        assert_eq!(timeout.type_name.as_deref(), Some("int"));
        assert_eq!(timeout.default_value, Some(json!(30)));
        assert_eq!(timeout.description, None);
        assert!(!timeout.is_deprecated());
        assert_eq!(timeout.schema, Some(json!({"type": "integer", "format": "int32"})));

        let attempts = &items[1];
        assert_eq!(attempts.name, "root.retry.maxAttempts");
        assert_eq!(attempts.default_value, Some(json!(3)));
        assert_eq!(attempts.source_type.as_deref(), Some("com.acme.RootProperties.Retry"));
        let deprecation = attempts.deprecation.as_ref().unwrap();
        assert_eq!(deprecation.replacement.as_deref(), Some("root.retry.limit"));
        assert_eq!(deprecation.level, DeprecationLevel::Warning);
    }

    #[test]
    fn test_groups_precede_their_properties() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(tmp.path(), &[("com/acme/RootProperties.java", sources::RETRY_PROPERTIES)]);

        let events = events(&index, "com.acme.RootProperties", NameStyle::AsDeclared);
        let WalkEvent::Group(root) = &events[0] else {
            panic!("expected a group first");
        };
        assert_eq!(root.name, "root");
        assert_eq!(root.type_name.as_deref(), Some("com.acme.RootProperties"));

        let WalkEvent::Group(retry) = &events[2] else {
            panic!("expected the retry group, got {:?}", events[2]);
        };
        assert_eq!(retry.name, "root.retry");
        assert_eq!(retry.type_name.as_deref(), Some("com.acme.RootProperties.Retry"));
        assert_eq!(retry.source_type.as_deref(), Some("com.acme.RootProperties"));
    }

    #[test]
    fn test_enums_maps_and_accessor_deprecation() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(tmp.path(), &[("com/acme/AcmeProperties.java", sources::ACME_PROPERTIES)]);
        let events = events(&index, "com.acme.AcmeProperties", NameStyle::AsDeclared);

        assert_eq!(
            property_names(&events),
            vec![
                "acme.server.host",
                "acme.server.hostname",
                "acme.server.port",
                "acme.server.enumeratedOption",
                "acme.server.enumeratedOptions",
                "acme.server.enumeratedMap.<key>.value",
                "acme.server.nested.name",
            ]
        );

        let item = |name: &str| {
            events
                .iter()
                .find_map(|e| match e {
                    WalkEvent::Property(item) if item.name == name => Some(item.clone()),
                    _ => None,
                })
                .unwrap()
        };
        let hint = |name: &str| {
            events.iter().find_map(|e| match e {
                WalkEvent::Hint(hint) if hint.name == name => Some(hint.clone()),
                _ => None,
            })
        };

        let host = item("acme.server.host");
        assert_eq!(host.description.as_deref(), Some("The host for the Acme server."));
        let deprecation = host.deprecation.unwrap();
        assert_eq!(deprecation.reason.as_deref(), Some("Deprecation reason"));
        assert_eq!(deprecation.replacement.as_deref(), Some("acme.server.hostname"));

        let port = item("acme.server.port");
        assert_eq!(port.type_name.as_deref(), Some("java.lang.Integer"));
        assert_eq!(port.default_value, Some(json!(8080)));

        let option = item("acme.server.enumeratedOption");
        assert_eq!(option.default_value, Some(json!("OPTION_1")));
        assert_eq!(hint("acme.server.enumeratedOption").unwrap().values.len(), 3);

        let options = item("acme.server.enumeratedOptions");
        assert_eq!(
            options.type_name.as_deref(),
            Some("java.util.List<com.acme.AcmeProperties.EnumeratedOptions>")
        );
        assert_eq!(options.default_value, None);
        assert_eq!(
            options.schema,
            Some(json!({
                "type": "array",
                "items": {"type": "string", "enum": ["OPTION_1", "OPTION_2", "OPTION_3"]}
            }))
        );
        assert!(hint("acme.server.enumeratedOptions").is_some());

        let keys = hint("acme.server.enumeratedMap.keys").unwrap();
        assert_eq!(keys.values[0].value, "VALUE_1");

        let value = item("acme.server.enumeratedMap.<key>.value");
        assert_eq!(value.description.as_deref(), Some("The value used by the enumerated value."));
    }

    #[test]
    fn test_collections_of_holders_use_index_placeholder() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[(
                "com/acme/ClusterProperties.java",
                r#"
package com.acme;

import java.util.List;
import org.springframework.boot.context.properties.ConfigurationProperties;

@ConfigurationProperties("cluster")
public class ClusterProperties {
    public List<Server> servers;
    public Server[] backups;

    public static class Server {
        public String host;
        public int port = 80;
    }
}
"#,
            )],
        );

        let events = events(&index, "com.acme.ClusterProperties", NameStyle::AsDeclared);
        assert_eq!(
            property_names(&events),
            vec![
                "cluster.servers[].host",
                "cluster.servers[].port",
                "cluster.backups[].host",
                "cluster.backups[].port",
            ]
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[
                ("com/acme/LoopProperties.java", sources::CYCLIC_PROPERTIES),
                ("com/acme/Node.java", sources::CYCLIC_NODE),
            ],
        );
        let resolver = SymbolResolver::new(&index);
        let walker = PropertyWalker::new(&resolver);

        let err = walker
            .properties(index.lookup("com.acme.LoopProperties")[0])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CyclicHolder);
        let WalkError::CyclicHolder { cycle, property, .. } = &err else {
            panic!("expected a cycle");
        };
        assert_eq!(
            cycle,
            &vec![
                "com.acme.LoopProperties".to_string(),
                "com.acme.Node".to_string(),
                "com.acme.LoopProperties".to_string(),
            ]
        );
        assert_eq!(property, "loop.node.back");

        // The walk ends with the error
        let mut walk = walker.walk(index.lookup("com.acme.LoopProperties")[0]);
        let results: Vec<_> = walk.by_ref().collect();
        assert!(results.last().unwrap().is_err());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_same_holder_in_sibling_branches_is_not_a_cycle() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[(
                "com/acme/MirrorProperties.java",
                r#"
package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;

@ConfigurationProperties("mirror")
public class MirrorProperties {
    public Endpoint primary;
    public Endpoint secondary;

    public static class Endpoint {
        public String url;
    }
}
"#,
            )],
        );

        let events = events(&index, "com.acme.MirrorProperties", NameStyle::AsDeclared);
        assert_eq!(
            property_names(&events),
            vec!["mirror.primary.url", "mirror.secondary.url"]
        );
    }

    #[test]
    fn test_holder_deprecation_is_inherited_unless_overridden() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[(
                "com/acme/LegacyProperties.java",
                r#"
package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;
import org.springframework.boot.context.properties.DeprecatedConfigurationProperty;

@ConfigurationProperties("legacy")
public class LegacyProperties {
    public Old old;

    @Deprecated(since = "2.0")
    public static class Old {
        public String name;

        private String path;

        @DeprecatedConfigurationProperty(reason = "Use legacy.location", replacement = "legacy.location")
        public String getPath() { return path; }
    }
}
"#,
            )],
        );

        let resolver = SymbolResolver::new(&index);
        let items = PropertyWalker::new(&resolver)
            .properties(index.lookup("com.acme.LegacyProperties")[0])
            .unwrap();

        let name = items[0].deprecation.as_ref().unwrap();
        assert_eq!(items[0].name, "legacy.old.name");
        assert_eq!(name.since.as_deref(), Some("2.0"));
        assert_eq!(name.replacement, None);

        let path = items[1].deprecation.as_ref().unwrap();
        assert_eq!(path.replacement.as_deref(), Some("legacy.location"));
        assert_eq!(path.since, None);
    }

    #[test]
    fn test_generic_holder_members_are_substituted() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[
                (
                    "com/acme/Wrapper.java",
                    "package com.acme; public class Wrapper<T> { public T item; public java.util.List<T> items; }",
                ),
                (
                    "com/acme/PoolProperties.java",
                    r#"
package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;

@ConfigurationProperties("pool")
public class PoolProperties extends Wrapper<PoolProperties.Slot> {
    public static class Slot {
        public int size = 4;
    }
}
"#,
                ),
            ],
        );

        let events = events(&index, "com.acme.PoolProperties", NameStyle::AsDeclared);
        assert_eq!(property_names(&events), vec!["pool.item.size", "pool.items[].size"]);
    }

    #[test]
    fn test_kebab_case_naming_keeps_prefix() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(tmp.path(), &[("com/acme/RootProperties.java", sources::RETRY_PROPERTIES)]);

        let events = events(&index, "com.acme.RootProperties", NameStyle::KebabCase);
        assert_eq!(property_names(&events), vec!["root.timeout", "root.retry.max-attempts"]);
    }

    #[test]
    fn test_walk_is_lazy_and_restartable() {
        let tmp = TempDir::new().unwrap();
        let index = index_sources(
            tmp.path(),
            &[(
                "com/acme/LazyProperties.java",
                r#"
package com.acme;

import org.springframework.boot.context.properties.ConfigurationProperties;

@ConfigurationProperties("lazy")
public class LazyProperties {
    public String first;
    public Missing second;
}
"#,
            )],
        );
        let resolver = SymbolResolver::new(&index);
        let walker = PropertyWalker::new(&resolver);
        let root = index.lookup("com.acme.LazyProperties")[0];

        let mut walk = walker.walk(root);
        assert!(matches!(walk.next(), Some(Ok(WalkEvent::Group(_)))));
        assert!(matches!(walk.next(), Some(Ok(WalkEvent::Property(_)))));
        assert!(matches!(walk.next(), Some(Err(WalkError::Resolve(_)))));

        // A fresh walk starts over
        let again: Vec<_> = walker.walk(root).take(2).collect();
        assert!(again.iter().all(Result::is_ok));
    }
}
