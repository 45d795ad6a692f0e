//! Implementation of `confmeta publish`.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use crate::core::artifact::{Coordinates, PublishArtifact, PublishReceipt};
use crate::ops::confmeta_extract::{extract, ExtractOptions, PipelineError};
use crate::publish::{PublishClient, PublishTarget, RetryPolicy, Transport, DEFAULT_TIMEOUT};
use crate::util::config::Config;
use crate::util::RunContext;

/// Options for the publish command.
#[derive(Debug, Clone)]
pub struct PublishOptions {
    pub extract: ExtractOptions,

    /// Base URL of the metadata repository
    pub endpoint: String,

    pub coordinates: Coordinates,

    /// Bearer token, if the repository needs one
    pub token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    pub retry: RetryPolicy,

    /// Stop before contacting the repository
    pub dry_run: bool,
}

impl PublishOptions {
    /// Options from the loaded configuration.
    ///
    /// The token is read from the environment variable named by
    /// `publish.token_env`. Fails when endpoint or coordinates are missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let publish = &config.publish;
        let endpoint = publish
            .endpoint
            .clone()
            .context("no repository endpoint configured\nhint: pass `--endpoint <url>` or set publish.endpoint")?;
        let required = |value: &Option<String>, label: &str| {
            value.clone().with_context(|| {
                format!(
                    "no artifact {} configured\nhint: pass `--{}` or set publish.{}",
                    label, label, label
                )
            })
        };
        let coordinates = Coordinates::new(
            required(&publish.namespace, "namespace")?,
            required(&publish.name, "name")?,
            required(&publish.version, "version")?,
        )?;

        Ok(PublishOptions {
            extract: ExtractOptions::from_config(config),
            endpoint,
            coordinates,
            token: std::env::var(publish.token_env()).ok().filter(|t| !t.is_empty()),
            timeout: publish.timeout(),
            retry: publish.retry_policy(),
            dry_run: false,
        })
    }
}

/// How a publish run ended.
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    Published(PublishReceipt),
    /// `--dry-run`: what would have been sent.
    DryRun {
        url: Url,
        fingerprint: String,
        size: usize,
    },
}

/// Extract and publish through the default HTTP client.
pub fn publish(ctx: &RunContext, opts: &PublishOptions) -> Result<PublishOutcome> {
    let client = PublishClient::new()
        .map_err(PipelineError::from)?
        .with_retry(opts.retry)
        .with_timeout(opts.timeout);
    publish_with(ctx, opts, &client)
}

/// Extract and publish through `client`.
pub fn publish_with<T: Transport>(
    ctx: &RunContext,
    opts: &PublishOptions,
    client: &PublishClient<T>,
) -> Result<PublishOutcome> {
    let target = PublishTarget::new(&opts.endpoint, opts.token.clone()).map_err(PipelineError::from)?;
    let extraction = extract(ctx, &opts.extract)?;
    let artifact = PublishArtifact::new(opts.coordinates.clone(), extraction.document);

    if opts.dry_run {
        let url = target
            .artifact_url(artifact.coordinates())
            .map_err(PipelineError::from)?;
        info!("dry run: not contacting {}", target.endpoint());
        return Ok(PublishOutcome::DryRun {
            url,
            fingerprint: artifact.fingerprint().to_string(),
            size: artifact.document().len(),
        });
    }

    let receipt = client
        .publish(&artifact, &target)
        .map_err(PipelineError::from)?;
    Ok(PublishOutcome::Published(receipt))
}

impl Default for PublishOptions {
    fn default() -> Self {
        PublishOptions {
            extract: ExtractOptions::default(),
            endpoint: String::new(),
            coordinates: Coordinates {
                namespace: String::new(),
                name: String::new(),
                version: String::new(),
            },
            token: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }
}
