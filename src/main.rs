use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use portal_resolver::application::services::{WrapperUrlParser, image_extension};
use portal_resolver::application::{ResolveAttachmentUseCase, ResolveBatchUseCase};
use portal_resolver::domain::entities::{CaseId, ResolvedImage, UnresolvedReason, is_direct_image_url};
use portal_resolver::infrastructure::{
    AppConfig, CliArgs, ConfigError, ConfigStore, MemoryResolutionCache, PortalHttpClient,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<(AppConfig, Option<ConfigStore>)> {
    let Ok(store) = ConfigStore::new(args.config.as_deref()) else {
        let mut config = AppConfig::default();
        config.merge_with_args(args);
        return Ok((config, None));
    };

    let mut config = store
        .load()
        .wrap_err_with(|| format!("failed to read {}", store.path().display()))?;
    config.merge_with_args(args);
    Ok((config, Some(store)))
}

async fn write_image(out_dir: &Path, case_id: &CaseId, bytes: &Bytes) -> Result<PathBuf> {
    let path = out_dir.join(format!("{case_id}.{}", image_extension(bytes)));
    tokio::fs::write(&path, bytes)
        .await
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Status line for an input that produced no bytes. Wrapper URLs are
/// always reported as unresolved, whatever their path looks like.
fn unresolved_line(parser: &WrapperUrlParser, input: &str, reason: &UnresolvedReason) -> String {
    if parser.is_wrapper(input) {
        format!("unresolved\t{input}\t{reason}")
    } else if is_direct_image_url(input) {
        format!("direct\t{input}")
    } else {
        format!("passthrough\t{input}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let (config, store) = load_config(&args)?;

    if args.write_default_config {
        let store = store.ok_or(ConfigError::ConfigDirNotFound)?;
        store.save(&AppConfig::default())?;
        println!("{}", store.path().display());
        return Ok(());
    }

    init_logging(&config)?;
    info!(version = portal_resolver::VERSION, "Starting {}", portal_resolver::NAME);

    if args.urls.is_empty() {
        warn!("No URLs given, nothing to resolve");
        return Ok(());
    }

    let portal = Arc::new(PortalHttpClient::new(&config.portal, &config.resolver)?);
    let cache = Arc::new(MemoryResolutionCache::new(config.resolver.cache_capacity));
    let resolver = Arc::new(
        ResolveAttachmentUseCase::new(
            portal,
            cache.clone(),
            Arc::new(config.portal.clone()),
            config.resolver.cache_ttl(),
        )
        .map_err(ConfigError::from)?,
    );
    let batch = ResolveBatchUseCase::new(
        resolver.clone(),
        config.resolver.max_concurrent_resolutions,
    );

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .wrap_err_with(|| format!("failed to create {}", args.out_dir.display()))?;

    let report = batch.execute(&args.urls).await;

    let mut written = HashSet::new();
    for (input, result) in &report.results {
        match result {
            ResolvedImage::Bytes(bytes) => {
                let Some(case) = resolver.parser().parse(input) else {
                    continue;
                };
                if written.insert(case.case_id.clone()) {
                    let path = write_image(&args.out_dir, &case.case_id, bytes).await?;
                    println!("resolved\t{input}\t{}", path.display());
                } else {
                    println!("resolved\t{input}\t(duplicate of case {})", case.case_id);
                }
            }
            ResolvedImage::Unresolved(reason) => {
                println!("{}", unresolved_line(resolver.parser(), input, reason));
            }
        }
    }

    println!("{}", cache.stats());
    Ok(())
}
