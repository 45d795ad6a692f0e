//! Core data structures for Confmeta.
//!
//! This module contains the types every pipeline stage exchanges:
//! - Type references as written in source and their resolved forms
//! - Recognized annotation markers
//! - Property items, groups, hints and the metadata model
//! - Publish coordinates, artifacts and receipts

pub mod artifact;
pub mod marker;
pub mod model;
pub mod property;
pub mod types;

pub use artifact::{Coordinates, PublishArtifact, PublishReceipt, ReceiptStatus};
pub use marker::{Marker, MarkerKind, MarkerSet, MarkerValue};
pub use model::MetadataModel;
pub use property::{
    Deprecation, DeprecationLevel, HintValue, PropertyGroup, PropertyItem, PropertyKind,
    ValueHint,
};
pub use types::{DeclId, ResolvedType, TypeKind, TypeReference};
