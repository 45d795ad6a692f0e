//! High-level operations.
//!
//! This module contains the implementation of Confmeta commands.

pub mod confmeta_extract;
pub mod confmeta_publish;

pub use confmeta_extract::{extract, write_document, ExtractOptions, Extraction, PipelineError};
pub use confmeta_publish::{publish, publish_with, PublishOptions, PublishOutcome};
