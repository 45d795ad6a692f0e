//! Confmeta CLI - extract and publish configuration-property metadata

use anyhow::Result;
use clap::Parser;
use miette::{GraphicalReportHandler, GraphicalTheme};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use confmeta::index::IndexError;
use confmeta::ops::PipelineError;
use confmeta::util::diagnostic;
use confmeta::RunContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        if let Some(pipeline) = e.downcast_ref::<PipelineError>() {
            report(pipeline, color);
        }
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("confmeta=debug")
    } else {
        EnvFilter::new("confmeta=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = match cli.project {
        Some(dir) => RunContext::with_cwd(dir),
        None => RunContext::new()?,
    };
    ctx.set_verbose(cli.verbose);

    // Execute command
    match cli.command {
        Commands::Extract(args) => commands::extract::execute(args, ctx),
        Commands::Publish(args) => commands::publish::execute(args, ctx),
    }
}

/// Print every diagnostic a failed stage collected.
fn report(err: &PipelineError, color: bool) {
    let PipelineError::Extraction(extraction) = err else {
        for d in err.diagnostics() {
            diagnostic::emit(&d, color);
        }
        return;
    };

    for index_error in &extraction.index_errors {
        match index_error {
            IndexError::Syntax(syntax) => {
                let theme = if color {
                    GraphicalTheme::unicode()
                } else {
                    GraphicalTheme::unicode_nocolor()
                };
                let mut out = String::new();
                match GraphicalReportHandler::new_themed(theme).render_report(&mut out, syntax.as_ref()) {
                    Ok(()) => eprint!("{}", out),
                    Err(_) => diagnostic::emit(&index_error.to_diagnostic(), color),
                }
            }
            other => diagnostic::emit(&other.to_diagnostic(), color),
        }
    }
    for module in &extraction.modules {
        for walk_error in &module.errors {
            diagnostic::emit(&walk_error.to_diagnostic(), color);
        }
    }
}
