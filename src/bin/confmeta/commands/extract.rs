//! `confmeta extract` command

use anyhow::Result;

use crate::cli::ExtractArgs;
use confmeta::ops::{extract, write_document};
use confmeta::RunContext;

pub fn execute(args: ExtractArgs, ctx: RunContext) -> Result<()> {
    let config = ctx.load_config();
    let mut ctx = ctx.configure(&config);
    if let Some(naming) = args.source.naming {
        ctx = ctx.with_naming(naming);
    }

    let opts = super::extract_options(&args.source, &config);
    let extraction = extract(&ctx, &opts)?;

    let output = args.output.as_ref().map(|p| ctx.cwd().join(p));
    write_document(&extraction.document, output.as_deref())?;

    eprintln!(
        "   Extracted {} properties from {} modules",
        extraction.model.len(),
        extraction.report.modules.len()
    );
    if ctx.is_verbose() {
        for module in &extraction.report.modules {
            eprintln!(
                "              {}: {} properties, {} roots",
                module.module,
                module.model.len(),
                module.roots
            );
        }
    }
    if let Some(path) = &output {
        eprintln!("     Written {}", ctx.display_path(path));
    }

    Ok(())
}
