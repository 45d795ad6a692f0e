//! Configuration file support for Confmeta.
//!
//! Confmeta supports two configuration file locations:
//! - Global: `~/.confmeta/config.toml` - User-wide defaults
//! - Project: `confmeta.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::marker::MarkerSet;
use crate::publish::RetryPolicy;
use crate::walker::NameStyle;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_NAME: &str = "confmeta.toml";

/// Environment variable holding the bearer token, unless configured otherwise.
pub const DEFAULT_TOKEN_ENV: &str = "CONFMETA_TOKEN";

/// Default read timeout for repository requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Confmeta configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recognized annotation names
    pub markers: MarkersConfig,

    /// Extraction settings
    pub extract: ExtractConfig,

    /// Source modules of the project
    #[serde(rename = "module")]
    pub modules: Vec<ModuleConfig>,

    /// Repository settings
    pub publish: PublishConfig,
}

/// Marker annotation names. Unset lists keep the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkersConfig {
    pub root: Option<Vec<String>>,
    pub nested: Option<Vec<String>>,
    pub deprecated: Option<Vec<String>>,
    pub accessors: Option<Vec<String>>,
}

/// Extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// How member names become property names
    pub naming: Option<NameStyle>,

    /// Glob patterns (relative to each source root) of files to skip
    pub exclude: Vec<String>,

    /// Supplementary metadata documents (glob patterns, relative to the project)
    pub supplementary: Vec<String>,
}

/// A source module and the modules or archives it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,

    /// Source roots, relative to the project directory
    pub sources: Vec<PathBuf>,

    /// Other module names, or paths to archives and surface descriptors
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Repository settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Base URL of the metadata repository
    pub endpoint: Option<String>,

    pub namespace: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,

    /// Environment variable holding the bearer token
    pub token_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Maximum number of attempts for transient failures
    pub max_attempts: Option<u32>,

    /// First backoff delay in milliseconds
    pub base_delay_ms: Option<u64>,

    /// Backoff cap in milliseconds
    pub max_delay_ms: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Markers
        if other.markers.root.is_some() {
            self.markers.root = other.markers.root;
        }
        if other.markers.nested.is_some() {
            self.markers.nested = other.markers.nested;
        }
        if other.markers.deprecated.is_some() {
            self.markers.deprecated = other.markers.deprecated;
        }
        if other.markers.accessors.is_some() {
            self.markers.accessors = other.markers.accessors;
        }

        // Extraction
        if other.extract.naming.is_some() {
            self.extract.naming = other.extract.naming;
        }
        if !other.extract.exclude.is_empty() {
            self.extract.exclude = other.extract.exclude;
        }
        if !other.extract.supplementary.is_empty() {
            self.extract.supplementary = other.extract.supplementary;
        }

        // Modules describe one project; they are never combined
        if !other.modules.is_empty() {
            self.modules = other.modules;
        }

        // Publish
        let publish = other.publish;
        if publish.endpoint.is_some() {
            self.publish.endpoint = publish.endpoint;
        }
        if publish.namespace.is_some() {
            self.publish.namespace = publish.namespace;
        }
        if publish.name.is_some() {
            self.publish.name = publish.name;
        }
        if publish.version.is_some() {
            self.publish.version = publish.version;
        }
        if publish.token_env.is_some() {
            self.publish.token_env = publish.token_env;
        }
        if publish.timeout_secs.is_some() {
            self.publish.timeout_secs = publish.timeout_secs;
        }
        if publish.max_attempts.is_some() {
            self.publish.max_attempts = publish.max_attempts;
        }
        if publish.base_delay_ms.is_some() {
            self.publish.base_delay_ms = publish.base_delay_ms;
        }
        if publish.max_delay_ms.is_some() {
            self.publish.max_delay_ms = publish.max_delay_ms;
        }
    }

    /// The recognized marker names, defaults filled in.
    pub fn marker_set(&self) -> MarkerSet {
        let defaults = MarkerSet::default();
        MarkerSet {
            root: self.markers.root.clone().unwrap_or(defaults.root),
            nested: self.markers.nested.clone().unwrap_or(defaults.nested),
            deprecated: self
                .markers
                .deprecated
                .clone()
                .unwrap_or(defaults.deprecated),
            accessors: self.markers.accessors.clone().unwrap_or(defaults.accessors),
        }
    }

    pub fn naming(&self) -> NameStyle {
        self.extract.naming.unwrap_or_default()
    }
}

impl PublishConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn token_env(&self) -> &str {
        self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV)
    }

    /// Retry policy with configured values over the defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy::new(
            self.base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            self.max_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
            self.max_attempts.unwrap_or(defaults.max_attempts),
        )
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (confmeta.toml)
/// 2. Global config (~/.confmeta/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global confmeta config directory (~/.confmeta).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".confmeta"))
}

/// Get the global config path (~/.confmeta/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (confmeta.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}
