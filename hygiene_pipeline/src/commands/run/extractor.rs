//! Implementation of command line option for running the extractor

use backoff::BackoffConfig;
use clap_blocks::{
    extractor::ExtractorConfig, object_store::make_object_store, run_config::RunConfig,
};
use extractor::{Extractor, HttpEventSink, HttpSourceFeed};
use hyg_time::SystemProvider;
use hygd_extractor::create_extractor_server_type;
use observability_deps::tracing::*;
use std::sync::Arc;
use telemetry::{ChunkMetricSink, HttpMetricSink, LoggingMetricSink};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Run: {0}")]
    Run(#[from] super::main::Error),

    #[error("Cannot parse object store config: {0}")]
    ObjectStoreParsing(#[from] clap_blocks::object_store::ParseError),

    #[error("Cannot build feed client: {0}")]
    Feed(#[from] extractor::FeedError),

    #[error("Cannot build event client: {0}")]
    Events(#[from] extractor::EventSinkError),

    #[error("Cannot build telemetry client: {0}")]
    Telemetry(#[from] telemetry::Error),
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "run",
    about = "Runs in extractor mode",
    long_about = "Run the hygiene pipeline extractor server.\n\nThe configuration options below can be \
    set either with the command line flags or with the specified environment \
    variable. If there is a file named '.env' in the current working directory, \
    it is sourced before loading the configuration.

Configuration is loaded from the following sources (highest precedence first):
        - command line arguments
        - user set environment variables
        - .env file contents
        - pre-configured default values"
)]
pub struct Config {
    #[clap(flatten)]
    pub(crate) run_config: RunConfig,

    #[clap(flatten)]
    pub(crate) extractor_config: ExtractorConfig,
}

pub async fn command(config: Config) -> Result<(), Error> {
    let object_store = make_object_store(config.run_config.object_store_config())?;

    let timeout = config.extractor_config.feed_timeout();
    let feed = HttpSourceFeed::new(&config.extractor_config.source_url, timeout)?;
    let events = HttpEventSink::new(&config.extractor_config.trigger_url, timeout)?;

    let metrics: Arc<dyn ChunkMetricSink> = match &config.extractor_config.metrics_url {
        Some(url) => Arc::new(HttpMetricSink::new(url, timeout)?),
        None => {
            info!("no metrics endpoint configured, chunk metrics go to the process log");
            Arc::new(LoggingMetricSink)
        }
    };

    let shutdown = CancellationToken::new();
    let engine = Arc::new(Extractor::new(
        Arc::new(feed),
        object_store,
        metrics,
        Arc::new(events),
        Arc::new(SystemProvider::new()),
        BackoffConfig::default(),
        shutdown.clone(),
    ));

    let server_type = create_extractor_server_type(engine, shutdown.clone());

    info!("starting extractor");

    Ok(super::main::main(config.run_config.http_bind_address, server_type, shutdown).await?)
}
