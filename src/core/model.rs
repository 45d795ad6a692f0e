//! The metadata model produced per module and merged per publish.

use serde::{Deserialize, Serialize};

use crate::core::property::{PropertyGroup, PropertyItem, ValueHint};

/// Groups, property items and value hints.
///
/// Items are kept in the order they were produced (source declaration order
/// after extraction). Equality ignores that order: two models are equal when
/// they hold the same entries by name, which is what the wire document
/// preserves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataModel {
    #[serde(default)]
    pub groups: Vec<PropertyGroup>,

    #[serde(default)]
    pub properties: Vec<PropertyItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<ValueHint>,
}

impl MetadataModel {
    pub fn new() -> Self {
        MetadataModel::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.properties.is_empty() && self.hints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Find a property item by full name.
    pub fn property(&self, name: &str) -> Option<&PropertyItem> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&PropertyGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn hint(&self, name: &str) -> Option<&ValueHint> {
        self.hints.iter().find(|h| h.name == name)
    }

    /// Full property names in current order.
    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    /// Append everything from `other`, keeping order.
    pub fn extend(&mut self, other: MetadataModel) {
        self.groups.extend(other.groups);
        self.properties.extend(other.properties);
        self.hints.extend(other.hints);
    }

    /// Sort every list lexicographically by name (stable for equal names).
    pub fn sort(&mut self) {
        self.groups.sort_by(|a, b| a.name.cmp(&b.name));
        self.properties.sort_by(|a, b| a.name.cmp(&b.name));
        self.hints.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// A copy in canonical (name-sorted) order.
    pub fn canonical(&self) -> MetadataModel {
        let mut model = self.clone();
        model.sort();
        model
    }
}

impl PartialEq for MetadataModel {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.canonical(), other.canonical());
        a.groups == b.groups && a.properties == b.properties && a.hints == b.hints
    }
}
