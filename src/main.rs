//! CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use docscrape::cli::Args;
use docscrape::config::Config;
use docscrape::fetcher::{CachedSession, DiskCache};
use docscrape::logging;
use docscrape::output;
use docscrape::pipelines::{PipelineOutput, PipelineRegistry, archive::save_archive};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let config = Config::from_env().context("invalid configuration")?;
    let log_file = logging::init(
        &config.logs_dir(),
        logging::default_level(args.verbose, args.quiet),
    )?;

    info!("docscrape starting");
    info!(mode = %args.mode, clear_cache = args.clear_cache, output = ?args.output_mode(), "arguments");
    debug!(?config, log_file = %log_file.display(), "configuration loaded");

    let session = CachedSession::new(DiskCache::new(config.cache_dir()))
        .with_max_retries(config.max_retries());
    if args.clear_cache {
        let removed = session.clear_cache().await?;
        info!(entries = removed, "cache cleared");
    }

    let registry = PipelineRegistry::with_defaults(&config);
    let pipeline = registry.get(&args.mode)?;

    match pipeline.run(&session).await? {
        PipelineOutput::Table(table) => {
            output::emit(
                &table,
                args.output_mode(),
                pipeline.kind(),
                &config.results_dir(),
            )?;
        }
        PipelineOutput::Archive(link) => {
            save_archive(&session, &link, &config.downloads_dir()).await?;
        }
    }

    info!("docscrape finished");
    Ok(())
}
