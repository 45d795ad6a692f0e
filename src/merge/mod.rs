//! Merging extracted models with supplementary documents.
//!
//! Extracted models are combined first. Two items with the same full name
//! must agree on type and default; any other field differing between them is
//! settled by a fixed ordering so the result does not depend on input order.
//!
//! Supplementary documents are then applied in order. They are hand-curated
//! and win on prose (description and deprecation) and on the schema, but they may not change
//! the type or default of an extracted item. Supplementary items naming no
//! extracted property are passed through.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::model::MetadataModel;
use crate::core::property::{Deprecation, DeprecationLevel, HintValue, PropertyGroup, PropertyItem, ValueHint};
use crate::util::diagnostic::{Diagnostic, ErrorKind};

/// Two inputs disagree on the shape of a property.
#[derive(Debug, Clone, Error)]
pub enum MergeError {
    #[error("conflicting {field} for `{name}`: `{value_a}` and `{value_b}`")]
    Conflict {
        name: String,
        /// `type` or `default`.
        field: &'static str,
        value_a: String,
        value_b: String,
        /// Where each value came from, when known.
        origin_a: Option<String>,
        origin_b: Option<String>,
    },
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MetadataConflict
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let MergeError::Conflict {
            name,
            field,
            value_a,
            value_b,
            origin_a,
            origin_b,
        } = self;

        let origin = |o: &Option<String>| o.clone().unwrap_or_else(|| "supplementary metadata".to_string());
        Diagnostic::error(format!("conflicting {} for property `{}`", field, name))
            .with_kind(self.kind())
            .with_context(format!("`{}` from {}", value_a, origin(origin_a)))
            .with_context(format!("`{}` from {}", value_b, origin(origin_b)))
            .with_suggestion(format!(
                "help: Make every declaration of `{}` agree on its {}, or drop it from the supplementary document",
                name, field
            ))
    }
}

/// Merge extracted models, then overlay supplementary documents in order.
pub fn merge(
    extracted: &[MetadataModel],
    supplementary: &[MetadataModel],
) -> Result<MetadataModel, MergeError> {
    let mut merger = MetadataMerger::new();
    for model in extracted {
        merger.add_extracted(model)?;
    }
    for document in supplementary {
        merger.apply_supplementary(document)?;
    }
    Ok(merger.finish())
}

/// Incremental merge state, keyed by full name.
#[derive(Debug, Default)]
pub struct MetadataMerger {
    groups: BTreeMap<String, PropertyGroup>,
    properties: BTreeMap<String, PropertyItem>,
    hints: BTreeMap<String, ValueHint>,
}

impl MetadataMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine one extracted model.
    pub fn add_extracted(&mut self, model: &MetadataModel) -> Result<(), MergeError> {
        for item in &model.properties {
            match self.properties.get_mut(&item.name) {
                Some(existing) => combine_items(existing, item)?,
                None => {
                    self.properties.insert(item.name.clone(), item.clone());
                }
            }
        }

        for group in &model.groups {
            match self.groups.get_mut(&group.name) {
                Some(existing) => {
                    existing.type_name = smaller(existing.type_name.take(), group.type_name.clone());
                    existing.source_type = smaller(existing.source_type.take(), group.source_type.clone());
                    existing.description = smaller(existing.description.take(), group.description.clone());
                }
                None => {
                    self.groups.insert(group.name.clone(), group.clone());
                }
            }
        }

        for hint in &model.hints {
            match self.hints.get_mut(&hint.name) {
                Some(existing) if existing.values != hint.values => {
                    union_values(&mut existing.values, &hint.values, false);
                    existing.values.sort_by(|a, b| a.value.cmp(&b.value));
                }
                Some(_) => {}
                None => {
                    self.hints.insert(hint.name.clone(), hint.clone());
                }
            }
        }
        Ok(())
    }

    /// Overlay one supplementary document.
    pub fn apply_supplementary(&mut self, document: &MetadataModel) -> Result<(), MergeError> {
        for item in &document.properties {
            let Some(existing) = self.properties.get_mut(&item.name) else {
                debug!("passing through supplementary property `{}`", item.name);
                self.properties.insert(item.name.clone(), item.clone());
                continue;
            };

            if let (Some(a), Some(b)) = (&existing.type_name, &item.type_name) {
                if a != b {
                    return Err(conflict(&item.name, "type", a.clone(), b.clone(), existing, None));
                }
            }
            if let (Some(a), Some(b)) = (&existing.default_value, &item.default_value) {
                if a != b {
                    return Err(conflict(&item.name, "default", render(a), render(b), existing, None));
                }
            }

            existing.type_name = existing.type_name.take().or_else(|| item.type_name.clone());
            existing.kind = existing.kind.take().or(item.kind);
            existing.source_type = existing.source_type.take().or_else(|| item.source_type.clone());
            existing.default_value = existing.default_value.take().or_else(|| item.default_value.clone());
            if item.description.is_some() {
                existing.description = item.description.clone();
            }
            if item.deprecation.is_some() {
                existing.deprecation = item.deprecation.clone();
            }
            if item.schema.is_some() {
                existing.schema = item.schema.clone();
            }
        }

        for group in &document.groups {
            match self.groups.get_mut(&group.name) {
                Some(existing) => {
                    if group.description.is_some() {
                        existing.description = group.description.clone();
                    }
                    existing.type_name = existing.type_name.take().or_else(|| group.type_name.clone());
                    existing.source_type = existing.source_type.take().or_else(|| group.source_type.clone());
                }
                None => {
                    self.groups.insert(group.name.clone(), group.clone());
                }
            }
        }

        for hint in &document.hints {
            match self.hints.get_mut(&hint.name) {
                Some(existing) => union_values(&mut existing.values, &hint.values, true),
                None => {
                    self.hints.insert(hint.name.clone(), hint.clone());
                }
            }
        }
        Ok(())
    }

    /// The merged model, in canonical order.
    pub fn finish(self) -> MetadataModel {
        let model = MetadataModel {
            groups: self.groups.into_values().collect(),
            properties: self.properties.into_values().collect(),
            hints: self.hints.into_values().collect(),
        };
        info!(
            "merged {} properties, {} groups, {} hints",
            model.properties.len(),
            model.groups.len(),
            model.hints.len()
        );
        model
    }
}

/// Fold extracted item `other` into `existing`.
fn combine_items(existing: &mut PropertyItem, other: &PropertyItem) -> Result<(), MergeError> {
    if let (Some(a), Some(b)) = (&existing.type_name, &other.type_name) {
        if a != b {
            return Err(conflict(&existing.name, "type", a.clone(), b.clone(), existing, Some(other)));
        }
    }
    if let (Some(a), Some(b)) = (&existing.default_value, &other.default_value) {
        if a != b {
            return Err(conflict(&existing.name, "default", render(a), render(b), existing, Some(other)));
        }
    }

    existing.type_name = existing.type_name.take().or_else(|| other.type_name.clone());
    existing.kind = existing.kind.take().or(other.kind);
    existing.default_value = existing.default_value.take().or_else(|| other.default_value.clone());
    existing.source_type = smaller(existing.source_type.take(), other.source_type.clone());
    existing.description = smaller(existing.description.take(), other.description.clone());
    existing.schema = match (existing.schema.take(), other.schema.clone()) {
        (Some(a), Some(b)) => Some(if render(&b) < render(&a) { b } else { a }),
        (a, b) => a.or(b),
    };
    existing.deprecation = match (existing.deprecation.take(), other.deprecation.clone()) {
        (Some(a), Some(b)) => Some(if deprecation_key(&b) < deprecation_key(&a) { b } else { a }),
        (a, b) => a.or(b),
    };
    Ok(())
}

/// The present value, or the smaller of two present values.
fn smaller(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn deprecation_key(d: &Deprecation) -> (bool, &Option<String>, &Option<String>, &Option<String>) {
    (
        d.level == DeprecationLevel::Error,
        &d.reason,
        &d.replacement,
        &d.since,
    )
}

/// Add values missing from `target`; with `describe`, incoming descriptions win.
fn union_values(target: &mut Vec<HintValue>, incoming: &[HintValue], describe: bool) {
    for value in incoming {
        match target.iter_mut().find(|v| v.value == value.value) {
            Some(existing) => {
                if describe && value.description.is_some() {
                    existing.description = value.description.clone();
                } else if existing.description.is_none() {
                    existing.description = value.description.clone();
                }
            }
            None => target.push(value.clone()),
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn conflict(
    name: &str,
    field: &'static str,
    value_a: String,
    value_b: String,
    a: &PropertyItem,
    b: Option<&PropertyItem>,
) -> MergeError {
    MergeError::Conflict {
        name: name.to_string(),
        field,
        value_a,
        value_b,
        origin_a: a.source_type.clone(),
        origin_b: b.and_then(|b| b.source_type.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extracted(items: Vec<PropertyItem>) -> MetadataModel {
        MetadataModel {
            properties: items,
            ..MetadataModel::default()
        }
    }

    fn timeout() -> PropertyItem {
        PropertyItem::named("root.timeout")
            .with_type("int")
            .with_default(json!(30))
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = extracted(vec![
            timeout().with_description("Timeout in seconds."),
            PropertyItem::named("root.name").with_type("java.lang.String"),
        ]);
        let b = extracted(vec![
            timeout().with_description("Request timeout."),
            PropertyItem::named("root.retry.maxAttempts")
                .with_type("int")
                .with_deprecation(Deprecation {
                    replacement: Some("root.retry.limit".into()),
                    ..Deprecation::default()
                }),
        ]);
        let c = extracted(vec![timeout()]);

        let expected = merge(&[a.clone(), b.clone(), c.clone()], &[]).unwrap();
        for perm in [
            vec![a.clone(), c.clone(), b.clone()],
            vec![b.clone(), a.clone(), c.clone()],
            vec![b.clone(), c.clone(), a.clone()],
            vec![c.clone(), a.clone(), b.clone()],
            vec![c, b, a],
        ] {
            let merged = merge(&perm, &[]).unwrap();
            assert_eq!(merged, expected);
            assert_eq!(
                merged.property("root.timeout").unwrap().description.as_deref(),
                Some("Request timeout.")
            );
        }
        assert_eq!(expected.names(), vec!["root.name", "root.retry.maxAttempts", "root.timeout"]);
    }

    #[test]
    fn test_type_conflict_is_fatal() {
        let a = extracted(vec![timeout()]);
        let b = extracted(vec![PropertyItem::named("root.timeout").with_type("java.time.Duration")]);

        let err = merge(&[a, b], &[]).unwrap_err();
        let MergeError::Conflict { name, field, .. } = &err;
        assert_eq!(name, "root.timeout");
        assert_eq!(*field, "type");
        assert_eq!(err.kind(), ErrorKind::MetadataConflict);
        assert!(err
            .to_diagnostic()
            .format(false)
            .starts_with("error[MetadataConflictError]"));
    }

    #[test]
    fn test_default_conflict_is_fatal() {
        let a = extracted(vec![timeout()]);
        let b = extracted(vec![timeout().with_default(json!(60))]);
        assert!(merge(&[a.clone(), b.clone()], &[]).is_err());
        assert!(merge(&[b], &[a]).is_err());
    }

    #[test]
    fn test_supplementary_type_conflict_is_fatal() {
        let a = extracted(vec![timeout()]);
        let doc = extracted(vec![PropertyItem::named("root.timeout").with_type("long")]);
        let err = merge(&[a], &[doc]).unwrap_err();
        let MergeError::Conflict { value_a, value_b, .. } = err;
        assert_eq!((value_a.as_str(), value_b.as_str()), ("int", "long"));
    }

    #[test]
    fn test_supplementary_overrides_prose() {
        let a = extracted(vec![timeout().with_description("From source.")]);
        let doc = extracted(vec![PropertyItem::named("root.timeout")
            .with_description("Curated.")
            .with_deprecation(Deprecation {
                reason: Some("Use root.deadline".into()),
                ..Deprecation::default()
            })]);

        let merged = merge(&[a], &[doc]).unwrap();
        let item = merged.property("root.timeout").unwrap();
        assert_eq!(item.description.as_deref(), Some("Curated."));
        assert_eq!(item.type_name.as_deref(), Some("int"));
        assert_eq!(item.default_value, Some(json!(30)));
        assert!(item.is_deprecated());
    }

    #[test]
    fn test_supplementary_schema_replaces_extracted_schema() {
        let mut from_source = timeout();
        from_source.schema = Some(json!({"type": "integer", "format": "int32"}));
        let mut curated = PropertyItem::named("root.timeout");
        curated.schema = Some(json!({"type": "integer", "minimum": 1}));

        let merged = merge(&[extracted(vec![from_source.clone()])], &[extracted(vec![curated])]).unwrap();
        assert_eq!(
            merged.property("root.timeout").unwrap().schema,
            Some(json!({"type": "integer", "minimum": 1}))
        );

        let merged = merge(
            &[extracted(vec![from_source])],
            &[extracted(vec![PropertyItem::named("root.timeout").with_description("Curated.")])],
        )
        .unwrap();
        assert_eq!(
            merged.property("root.timeout").unwrap().schema,
            Some(json!({"type": "integer", "format": "int32"}))
        );
    }

    #[test]
    fn test_last_supplementary_description_wins() {
        let a = extracted(vec![timeout()]);
        let first = extracted(vec![PropertyItem::named("root.timeout").with_description("First.")]);
        let second = extracted(vec![PropertyItem::named("root.timeout").with_description("Second.")]);

        let merged = merge(&[a.clone()], &[first.clone(), second.clone()]).unwrap();
        assert_eq!(
            merged.property("root.timeout").unwrap().description.as_deref(),
            Some("Second.")
        );

        let merged = merge(&[a], &[second, first]).unwrap();
        assert_eq!(
            merged.property("root.timeout").unwrap().description.as_deref(),
            Some("First.")
        );
    }

    #[test]
    fn test_unmatched_supplementary_items_pass_through() {
        let a = extracted(vec![timeout()]);
        let doc = MetadataModel {
            properties: vec![PropertyItem::named("root.runtime-flag")
                .with_type("boolean")
                .with_description("Set programmatically.")],
            hints: vec![ValueHint {
                name: "root.runtime-flag".into(),
                values: vec![HintValue {
                    value: "true".into(),
                    description: None,
                }],
            }],
            ..MetadataModel::default()
        };

        let merged = merge(&[a], &[doc.clone()]).unwrap();
        assert_eq!(merged.property("root.runtime-flag"), doc.properties.first());
        assert!(merged.hint("root.runtime-flag").is_some());
        assert_eq!(merged.names(), vec!["root.runtime-flag", "root.timeout"]);
    }

    #[test]
    fn test_hint_descriptions_come_from_supplementary() {
        let hint = |desc: Option<&str>| ValueHint {
            name: "acme.mode".into(),
            values: vec![
                HintValue {
                    value: "FAST".into(),
                    description: desc.map(String::from),
                },
                HintValue {
                    value: "SAFE".into(),
                    description: None,
                },
            ],
        };
        let a = MetadataModel {
            hints: vec![hint(None)],
            ..MetadataModel::default()
        };
        let doc = MetadataModel {
            hints: vec![hint(Some("Skips validation."))],
            ..MetadataModel::default()
        };

        let merged = merge(&[a], &[doc]).unwrap();
        let values = &merged.hint("acme.mode").unwrap().values;
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].description.as_deref(), Some("Skips validation."));
    }
}
