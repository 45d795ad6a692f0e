//! `confmeta publish` command

use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::PublishArgs;
use confmeta::core::artifact::{Coordinates, ReceiptStatus};
use confmeta::ops::{publish, PublishOptions, PublishOutcome};
use confmeta::publish::RetryPolicy;
use confmeta::RunContext;

pub fn execute(args: PublishArgs, ctx: RunContext) -> Result<()> {
    let mut config = ctx.load_config();
    let mut ctx = ctx.configure(&config);
    if let Some(naming) = args.source.naming {
        ctx = ctx.with_naming(naming);
    }

    // Flags override configuration
    if let Some(endpoint) = &args.endpoint {
        config.publish.endpoint = Some(endpoint.clone());
    }
    if let Some(coordinates) = &args.coordinates {
        let coordinates: Coordinates = coordinates
            .parse()
            .with_context(|| format!("invalid --coordinates `{}`", coordinates))?;
        config.publish.namespace = Some(coordinates.namespace);
        config.publish.name = Some(coordinates.name);
        config.publish.version = Some(coordinates.version);
    }

    let mut opts = PublishOptions::from_config(&config)?;
    opts.extract = super::extract_options(&args.source, &config);
    opts.dry_run = args.dry_run;
    if args.token.is_some() {
        opts.token = args.token;
    }
    if let Some(secs) = args.timeout {
        opts.timeout = Duration::from_secs(secs);
    }
    if let Some(max_attempts) = args.max_attempts {
        opts.retry = RetryPolicy::new(opts.retry.base_delay, opts.retry.max_delay, max_attempts);
    }

    match publish(&ctx, &opts)? {
        PublishOutcome::DryRun {
            url,
            fingerprint,
            size,
        } => {
            println!("{}", url);
            println!("{}", fingerprint);
            eprintln!(
                "     Dry run {} ({} bytes), nothing was sent",
                opts.coordinates, size
            );
        }
        PublishOutcome::Published(receipt) => match receipt.status {
            ReceiptStatus::Created => eprintln!(
                "   Published {} -> {} ({})",
                receipt.coordinates, receipt.location, receipt.fingerprint
            ),
            ReceiptStatus::Unchanged => eprintln!(
                "  Up to date {} ({})",
                receipt.coordinates, receipt.fingerprint
            ),
        },
    }

    Ok(())
}
