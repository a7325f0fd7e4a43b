//! bucket-index CLI.

use anyhow::bail;
use bucket_index::{Config, HtmlRenderer, S3ObjectStore, SyncEngine, normalize_prefix};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bucket-index")]
#[command(about = "Generate directory index pages for an S3 bucket")]
#[command(version)]
struct Args {
    /// Bucket to index
    bucket: String,

    /// AWS region (defaults to the ambient AWS configuration)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// S3 endpoint override, for MinIO-compatible stores
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Only sync the subtree rooted at this folder path
    #[arg(long, default_value = "")]
    target_path: String,

    /// Object name to omit from listings (repeatable)
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Maximum number of folders synced concurrently
    #[arg(long, default_value = "8", env = "BUCKET_INDEX_CONCURRENCY")]
    concurrency: usize,

    /// Enable debug logging
    #[arg(short, long, env = "BUCKET_INDEX_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bucket_index={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config {
        bucket: args.bucket,
        region: args.region,
        endpoint_override: args.endpoint_url,
        target_prefix: normalize_prefix(&args.target_path),
        exclude: args.exclude,
        concurrency: args.concurrency,
    };
    config.validate()?;

    let store = S3ObjectStore::from_env(&config).await;
    let renderer = HtmlRenderer::new(&config.bucket, config.exclude.clone());
    let engine = SyncEngine::new(store, renderer, config);

    let report = engine.run().await;
    if !report.failures.is_empty() {
        for failure in &report.failures {
            error!("folder \"{}\": {}", failure.prefix, failure.error);
        }
        bail!(
            "{} of {} folders failed to sync",
            report.failures.len(),
            report.folders_attempted()
        );
    }

    Ok(())
}
