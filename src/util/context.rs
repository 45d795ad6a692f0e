//! Per-run context for Confmeta operations.
//!
//! A `RunContext` is created once per pipeline invocation and passed down
//! explicitly. Nothing here is process-wide state, so two runs in the same
//! process never observe each other's settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::marker::MarkerSet;
use crate::util::config::{self, Config};
use crate::util::fs::relative_path;
use crate::walker::NameStyle;

/// Settings shared by every stage of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Current working directory
    cwd: PathBuf,

    /// Recognized marker annotations
    markers: MarkerSet,

    /// How member names become property names
    naming: NameStyle,

    /// Verbose output enabled
    verbose: bool,
}

impl RunContext {
    /// Create a context rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd` with default settings.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        RunContext {
            cwd: cwd.into(),
            markers: MarkerSet::default(),
            naming: NameStyle::default(),
            verbose: false,
        }
    }

    /// Apply marker and naming settings from a loaded configuration.
    pub fn configure(mut self, config: &Config) -> Self {
        self.markers = config.marker_set();
        self.naming = config.naming();
        self
    }

    pub fn with_naming(mut self, naming: NameStyle) -> Self {
        self.naming = naming;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn naming(&self) -> NameStyle {
        self.naming
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Load the layered configuration for the project in the working directory.
    pub fn load_config(&self) -> Config {
        let global = config::global_config_path();
        config::load_config(global.as_deref(), &config::project_config_path(&self.cwd))
    }

    /// Render a path relative to the working directory for messages.
    pub fn display_path(&self, path: &Path) -> String {
        relative_path(&self.cwd, path).display().to_string()
    }
}
