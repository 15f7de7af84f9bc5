// Entry point for the bucket-to-BigQuery image text job

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use image_text_etl::core::config::{Cli, Config};
use image_text_etl::orchestration::Pipeline;
use image_text_etl::services::{
    BigQueryClient, GcsClient, TokenBroker, TranslateClient, VisionClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Validate credentials and arguments before any client exists
    let cli = Cli::parse();
    let config = Config::new(cli)?;

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "image_text_etl={}",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "project: {}, bucket: {}",
        config.project_id(),
        config.bucket()
    );

    // Set up clients. One HTTP client, one token broker, shared everywhere.
    let tokens = TokenBroker::from_credentials_file(config.credentials_path())?;
    let http = reqwest::Client::new();

    let storage = Arc::new(GcsClient::new(http.clone(), tokens.clone(), config.bucket()));
    let detector = Arc::new(VisionClient::new(http.clone(), tokens.clone()));
    let translator = Arc::new(TranslateClient::new(http.clone(), tokens.clone()));
    let sink = Arc::new(BigQueryClient::new(http, tokens, config.project_id()));

    // Resolve the fixed destination table up front; a missing table must
    // abort before any image is fetched.
    sink.resolve_table()
        .await
        .context("destination table lookup failed")?;

    let pipeline = Pipeline::new(storage, detector, translator, sink);
    let summary = pipeline.run().await?;

    info!(
        "run complete: {} objects seen, {} images processed, {} rows inserted, {} insert errors",
        summary.objects_seen,
        summary.images_processed,
        summary.records_inserted,
        summary.insert_errors
    );

    Ok(())
}
