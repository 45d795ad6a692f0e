//! Implementation of `confmeta extract`.
//!
//! Builds the index over every configured module, extracts each source
//! module, and stops if anything went wrong. Only a clean extraction is
//! merged with the supplementary documents and serialized.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::model::MetadataModel;
use crate::extract::{ExtractionReport, MetadataExtractor};
use crate::index::{ModuleSpec, SourceIndex};
use crate::merge::{merge, MergeError};
use crate::publish::PublishError;
use crate::resolver::SymbolResolver;
use crate::serialize::{self, SerializationError};
use crate::util::config::{Config, ModuleConfig};
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{compile_patterns, glob_files};
use crate::util::RunContext;
use crate::walker::PropertyWalker;

/// Options for an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Source modules. Paths are relative to the working directory.
    pub modules: Vec<ModuleConfig>,

    /// Glob patterns of source files to skip, relative to each source root
    pub exclude: Vec<String>,

    /// Supplementary documents: paths or glob patterns
    pub supplementary: Vec<String>,
}

impl ExtractOptions {
    /// Options taken from the `[[module]]` and `[extract]` sections.
    pub fn from_config(config: &Config) -> Self {
        ExtractOptions {
            modules: config.modules.clone(),
            exclude: config.extract.exclude.clone(),
            supplementary: config.extract.supplementary.clone(),
        }
    }
}

/// Result of a successful extraction.
#[derive(Debug)]
pub struct Extraction {
    /// The merged model, in canonical order.
    pub model: MetadataModel,
    /// The canonical document for `model`.
    pub document: Vec<u8>,
    pub report: ExtractionReport,
}

/// A pipeline stage failed with errors that have their own diagnostics.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extraction failed with {} error(s)", .0.error_count())]
    Extraction(ExtractionReport),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl PipelineError {
    /// Every diagnostic to show for this failure.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            PipelineError::Extraction(report) => report.diagnostics(),
            PipelineError::Merge(err) => vec![err.to_diagnostic()],
            PipelineError::Serialization(err) => vec![err.to_diagnostic()],
            PipelineError::Publish(err) => vec![err.to_diagnostic()],
        }
    }
}

/// Extract, merge and serialize.
pub fn extract(ctx: &RunContext, opts: &ExtractOptions) -> Result<Extraction> {
    if opts.modules.is_empty() {
        bail!(
            "no source modules configured\n\
             hint: pass `--source <dir>` or add a [[module]] section to confmeta.toml"
        );
    }

    let mut index = SourceIndex::new(ctx.markers().clone());
    for spec in module_specs(ctx, opts)? {
        index.register(spec)?;
    }
    let index_errors = index.build();
    info!(
        "indexed {} declarations in {} modules",
        index.len(),
        index.modules().len()
    );

    let resolver = SymbolResolver::new(&index);
    let walker = PropertyWalker::new(&resolver).with_naming(ctx.naming());
    let extractor = MetadataExtractor::new(walker);
    let report = ExtractionReport {
        index_errors,
        modules: extractor.extract_all(),
    };
    debug!("resolution cache holds {} entries", resolver.cache().len());

    if !report.is_clean() {
        return Err(PipelineError::Extraction(report).into());
    }

    let mut documents = Vec::new();
    for path in supplementary_paths(ctx, &opts.supplementary)? {
        debug!("reading supplementary document {}", ctx.display_path(&path));
        documents.push(serialize::read_document(&path).map_err(PipelineError::from)?);
    }

    let model = merge(&report.models(), &documents).map_err(PipelineError::from)?;
    let document = serialize::to_document(&model).map_err(PipelineError::from)?;

    Ok(Extraction {
        model,
        document,
        report,
    })
}

/// Module specs for every configured module and the archives they name.
///
/// A dependency naming another configured module links to it; anything else
/// is a path to an archive, class directory or surface descriptor. Archives
/// are registered once, under the dependency string.
fn module_specs(ctx: &RunContext, opts: &ExtractOptions) -> Result<Vec<ModuleSpec>> {
    let exclude = compile_patterns(&opts.exclude)?;
    let module_names: HashSet<&str> = opts.modules.iter().map(|m| m.name.as_str()).collect();
    let mut archives = HashSet::new();
    let mut specs = Vec::new();

    for module in &opts.modules {
        let roots: Vec<PathBuf> = module.sources.iter().map(|s| ctx.cwd().join(s)).collect();
        let mut spec = ModuleSpec::source(module.name.clone(), roots).with_exclude(exclude.clone());

        for dep in &module.dependencies {
            if !module_names.contains(dep.as_str()) && archives.insert(dep.clone()) {
                specs.push(ModuleSpec::archive(dep.clone(), ctx.cwd().join(dep)));
            }
            spec = spec.depends_on(dep.clone());
        }
        specs.push(spec);
    }

    Ok(specs)
}

/// Resolve supplementary document paths and patterns, in the order given.
fn supplementary_paths(ctx: &RunContext, entries: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in entries {
        if entry.contains(['*', '?', '[']) {
            let matches = glob_files(ctx.cwd(), std::slice::from_ref(entry))?;
            if matches.is_empty() {
                tracing::warn!("no supplementary documents match `{}`", entry);
            }
            paths.extend(matches);
        } else {
            let path = ctx.cwd().join(entry);
            if !path.is_file() {
                bail!("supplementary document not found: {}", path.display());
            }
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Write the document to `path`, or print it to stdout.
pub fn write_document(document: &[u8], path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(path) => crate::util::fs::write_bytes(path, document),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(document)
                .context("failed to write document to stdout")
        }
    }
}
