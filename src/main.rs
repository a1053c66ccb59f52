//! `sift`: sort a folder of research-session files into archive records.

use clap::{Parser, Subcommand};
use sift_catalog::source::{CatalogSource, HttpSource, StaticSource};
use sift_config::Config;
use sift_library::Context;
use sift_library::ingest::{Outcome, Progress, run_batch};
use sift_storage::BackendHandle;
use sift_storage::backend::LocalBackend;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(name = "sift", version)]
#[command(about = "Match research-session files to archive sessions and find what still needs uploading")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "SIFT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Identify every file in a session folder and match it to a session
    Scan {
        /// Session folder
        dir: PathBuf,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
        /// Use a saved archive search response instead of querying the archive
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return fail("could not load configuration", err),
    };
    match cli.command {
        Command::Scan { dir, json, catalog } => scan(&config, &dir, json, catalog.as_deref()).await,
    }
}

async fn scan(config: &Config, dir: &Path, json: bool, catalog: Option<&Path>) -> ExitCode {
    let validated = match catalog {
        Some(_) => config.validate_settings(),
        None => config.validate(),
    };
    if let Err(err) = validated {
        return fail("invalid configuration", err);
    }
    let zone = match config.zone() {
        Ok(zone) => zone,
        Err(err) => return fail("invalid configuration", err),
    };

    let source: Box<dyn CatalogSource> = match catalog {
        Some(path) => match load_saved_catalog(path).await {
            Ok(source) => Box::new(source),
            Err(code) => return code,
        },
        None => Box::new(
            HttpSource::new(
                config.archive.instance.clone().unwrap_or_default(),
                config.archive.api_key.clone().unwrap_or_default(),
                &config.archive.group,
                &config.archive.project,
            )
            .with_concurrency(config.concurrency.network),
        ),
    };
    let ctx = match Context::fetch(source.as_ref()).await {
        Ok(ctx) => ctx
            .with_zone(zone)
            .with_concurrency(config.concurrency.files)
            .with_suggestions(config.suggestions),
        Err(err) => return fail("could not load the session catalog", err),
    };

    let root = match std::path::absolute(dir) {
        Ok(root) => root,
        Err(err) => return fail("invalid session folder", err),
    };
    let backend: BackendHandle = match LocalBackend::new("local", &root) {
        Ok(backend) => Arc::new(backend),
        Err(err) => return fail("invalid session folder", err),
    };

    let report = match run_batch(&backend, &ctx, None, log_progress).await {
        Ok(report) => report,
        Err(err) => return fail("could not scan session folder", err),
    };
    for line in report.summary() {
        tracing::info!("{line}");
    }
    for error in report.reportable_errors() {
        tracing::warn!(path = %error.path.display(), "{}", error.kind());
    }
    if json {
        match serde_json::to_string_pretty(&report.records) {
            Ok(output) => println!("{output}"),
            Err(err) => return fail("could not serialize records", err),
        }
    }
    ExitCode::SUCCESS
}

async fn load_saved_catalog(path: &Path) -> Result<StaticSource, ExitCode> {
    let json = tokio::fs::read_to_string(path).await.map_err(|err| fail("could not read saved catalog", err))?;
    StaticSource::from_json(&json).map_err(|err| fail("could not parse saved catalog", err))
}

fn log_progress(progress: Progress, outcome: &Outcome) {
    match outcome {
        Ok(record) => tracing::info!(
            %progress,
            path = %record.path.display(),
            format = %record.format,
            status = %record.upload_status,
            "processed"
        ),
        Err(error) => tracing::info!(%progress, path = %error.path.display(), error = %error.kind(), "failed"),
    }
}

fn fail(message: &str, err: impl Debug) -> ExitCode {
    tracing::error!("{message}: {err:?}");
    ExitCode::FAILURE
}
