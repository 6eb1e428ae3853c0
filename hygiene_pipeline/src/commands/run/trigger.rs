//! Implementation of command line option for running the trigger

use clap_blocks::{run_config::RunConfig, trigger::TriggerConfig};
use hygd_trigger::create_trigger_server_type;
use observability_deps::tracing::*;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use trigger::{
    DurationRecorder, HttpWorkerClient, MemoryCompletionCache, PipelineRouter, ServiceMap,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Run: {0}")]
    Run(#[from] super::main::Error),

    #[error("Cannot parse service config: {0}")]
    ServiceMap(#[from] trigger::ServiceMapError),

    #[error("Cannot build worker client: {0}")]
    Workers(#[from] trigger::WorkerError),

    #[error("Cannot create durations log: {0}")]
    Durations(#[from] trigger::DurationLogError),
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "run",
    about = "Runs in trigger mode",
    long_about = "Run the hygiene pipeline trigger (orchestrator) server.\n\nThe configuration options below can be \
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
    pub(crate) trigger_config: TriggerConfig,
}

pub async fn command(config: Config) -> Result<(), Error> {
    // an unparseable service map is fatal at startup
    let services = ServiceMap::from_base64(&config.trigger_config.service_config_b64)?;
    let workers = HttpWorkerClient::new(services, config.trigger_config.worker_timeout())?;
    let durations = DurationRecorder::new(&config.trigger_config.durations_dir)?;

    let router = Arc::new(PipelineRouter::new(
        Arc::new(MemoryCompletionCache::new()),
        Arc::new(workers),
        durations,
        config.trigger_config.enable_json_loader,
    ));

    let shutdown = CancellationToken::new();
    let server_type = create_trigger_server_type(router, shutdown.clone());

    info!(
        json_loader = config.trigger_config.enable_json_loader,
        "starting trigger"
    );

    Ok(super::main::main(config.run_config.http_bind_address, server_type, shutdown).await?)
}
