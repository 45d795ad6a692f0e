//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use confmeta::walker::NameStyle;

/// Confmeta - extract and publish configuration-property metadata
#[derive(Parser)]
#[command(name = "confmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract metadata and print or write the document
    Extract(ExtractArgs),

    /// Extract metadata and publish it to a repository
    Publish(PublishArgs),
}

/// Inputs shared by every command that extracts.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Source root of a single module (replaces [[module]] from confmeta.toml)
    #[arg(short, long = "source", value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Name of the module given with --source
    #[arg(long, default_value = "main")]
    pub module: String,

    /// Archive, class directory or surface descriptor the sources depend on
    #[arg(short, long = "dependency", value_name = "PATH")]
    pub dependencies: Vec<String>,

    /// Supplementary metadata document (path or glob)
    #[arg(long = "supplementary", value_name = "PATH")]
    pub supplementary: Vec<String>,

    /// Glob of source files to skip, relative to each source root
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Property naming style: as-declared or kebab-case
    #[arg(long)]
    pub naming: Option<NameStyle>,
}

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Base URL of the metadata repository
    #[arg(long, env = "CONFMETA_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Artifact coordinates as namespace:name:version
    #[arg(long, value_name = "NS:NAME:VERSION")]
    pub coordinates: Option<String>,

    /// Bearer token for the repository
    #[arg(long, env = "CONFMETA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum attempts per request for transient failures
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Print the target and fingerprint without contacting the repository
    #[arg(long)]
    pub dry_run: bool,
}
