//! Command implementations

pub mod extract;
pub mod publish;

use confmeta::ops::ExtractOptions;
use confmeta::util::config::{Config, ModuleConfig};

use crate::cli::SourceArgs;

/// Extraction options from the configuration, with flags applied on top.
///
/// `--source` replaces the configured modules with a single one. Other list
/// flags add to what the configuration already names.
pub fn extract_options(args: &SourceArgs, config: &Config) -> ExtractOptions {
    let mut opts = ExtractOptions::from_config(config);

    if !args.sources.is_empty() {
        opts.modules = vec![ModuleConfig {
            name: args.module.clone(),
            sources: args.sources.clone(),
            dependencies: args.dependencies.clone(),
        }];
    } else {
        for module in &mut opts.modules {
            module.dependencies.extend(args.dependencies.iter().cloned());
        }
    }

    opts.exclude.extend(args.exclude.iter().cloned());
    opts.supplementary.extend(args.supplementary.iter().cloned());
    opts
}
