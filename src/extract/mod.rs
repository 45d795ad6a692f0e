//! Metadata extraction.
//!
//! [`MetadataExtractor`] finds the root holders of a source module and walks
//! each of them into one [`MetadataModel`]. Roots are walked in parallel; the
//! results are concatenated in source declaration order. A root whose walk
//! fails contributes nothing; its error is collected and the other roots
//! are still walked.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::model::MetadataModel;
use crate::core::types::DeclId;
use crate::index::{IndexError, ModuleId, ModuleKind};
use crate::util::diagnostic::Diagnostic;
use crate::walker::{PropertyWalker, WalkError, WalkEvent};

/// Extraction outcome of one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleExtraction {
    pub module: String,
    pub model: MetadataModel,
    /// Number of root holders found.
    pub roots: usize,
    pub errors: Vec<WalkError>,
}

/// Everything one run extracted, with every problem found on the way.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub index_errors: Vec<IndexError>,
    pub modules: Vec<ModuleExtraction>,
}

impl ExtractionReport {
    /// Whether indexing and every walk succeeded.
    pub fn is_clean(&self) -> bool {
        self.index_errors.is_empty() && self.modules.iter().all(|m| m.errors.is_empty())
    }

    pub fn error_count(&self) -> usize {
        self.index_errors.len() + self.modules.iter().map(|m| m.errors.len()).sum::<usize>()
    }

    /// Per-module models, in registration order.
    pub fn models(&self) -> Vec<MetadataModel> {
        self.modules.iter().map(|m| m.model.clone()).collect()
    }

    /// One diagnostic per collected error.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.index_errors
            .iter()
            .map(IndexError::to_diagnostic)
            .chain(
                self.modules
                    .iter()
                    .flat_map(|m| m.errors.iter().map(WalkError::to_diagnostic)),
            )
            .collect()
    }
}

/// Extracts metadata from the source modules of an index.
#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor<'r, 'a> {
    walker: PropertyWalker<'r, 'a>,
}

impl<'r, 'a> MetadataExtractor<'r, 'a> {
    pub fn new(walker: PropertyWalker<'r, 'a>) -> Self {
        MetadataExtractor { walker }
    }

    /// Root holders declared in `module`, in source order.
    pub fn roots(&self, module: ModuleId) -> Vec<DeclId> {
        self.walker.resolver().index().root_declarations(module)
    }

    /// Extract one module. A module without roots yields an empty model.
    pub fn extract(&self, module: ModuleId) -> ModuleExtraction {
        let index = self.walker.resolver().index();
        let name = index.module(module).name.clone();
        let roots = self.roots(module);

        let walked: Vec<Result<MetadataModel, WalkError>> =
            roots.par_iter().map(|root| self.walk_root(*root)).collect();

        let mut extraction = ModuleExtraction {
            module: name,
            roots: roots.len(),
            ..ModuleExtraction::default()
        };
        for result in walked {
            match result {
                Ok(model) => append(&mut extraction.model, model),
                Err(err) => extraction.errors.push(err),
            }
        }

        info!(
            "extracted {} properties from {} roots in module `{}`",
            extraction.model.len(),
            extraction.roots,
            extraction.module
        );
        extraction
    }

    /// Extract every source module, in registration order.
    pub fn extract_all(&self) -> Vec<ModuleExtraction> {
        let index = self.walker.resolver().index();
        let modules: Vec<ModuleId> = index
            .modules()
            .iter()
            .filter(|m| m.kind == ModuleKind::Source)
            .map(|m| m.id)
            .collect();

        modules.par_iter().map(|id| self.extract(*id)).collect()
    }

    fn walk_root(&self, root: DeclId) -> Result<MetadataModel, WalkError> {
        let mut model = MetadataModel::new();
        for event in self.walker.walk(root) {
            match event? {
                WalkEvent::Group(group) => model.groups.push(group),
                WalkEvent::Property(item) => model.properties.push(item),
                WalkEvent::Hint(hint) => model.hints.push(hint),
            }
        }

        debug!(
            "root `{}`: {} properties",
            self.walker.resolver().index().decl(root).qualified_name,
            model.len()
        );
        Ok(model)
    }
}

/// Append `other`, dropping groups and hints whose name is already present.
fn append(model: &mut MetadataModel, other: MetadataModel) {
    for group in other.groups {
        if model.group(&group.name).is_none() {
            model.groups.push(group);
        }
    }
    model.properties.extend(other.properties);
    for hint in other.hints {
        if model.hint(&hint.name).is_none() {
            model.hints.push(hint);
        }
    }
}
