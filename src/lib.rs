//! Confmeta - static extraction of configuration-property metadata
//!
//! This crate indexes Java source modules and their compiled dependencies,
//! walks every class carrying a configuration-holder marker, and produces a
//! canonical metadata document that can be merged with hand-written
//! supplementary metadata and published to a remote metadata repository.

pub mod core;
pub mod extract;
pub mod index;
pub mod java;
pub mod merge;
pub mod ops;
pub mod publish;
pub mod resolver;
pub mod serialize;
pub mod util;
pub mod walker;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides Java fixture trees and a mock publish
/// transport.
#[cfg(test)]
pub mod test_support;

pub use core::{
    artifact::{Coordinates, PublishArtifact, PublishReceipt},
    marker::{MarkerKind, MarkerSet},
    model::MetadataModel,
    property::{Deprecation, PropertyItem},
    types::{ResolvedType, TypeKind, TypeReference},
};

pub use index::SourceIndex;
pub use resolver::SymbolResolver;
pub use util::context::RunContext;
