//! Entrypoint for the hygiene pipeline services.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use clap::Parser;
use clap_blocks::logging::LoggingConfig;
use observability_deps::tracing::*;
use tracing_subscriber::EnvFilter;

mod commands {
    pub mod run;
}

#[derive(Debug, clap::Parser)]
#[clap(
    name = "hygiene_pipeline",
    about = "Fault-tolerant ingestion pipeline for public food-inspection records",
    long_about = r#"Fault-tolerant ingestion pipeline for public food-inspection records.

Examples:
    # Run the trigger (orchestrator) service
    hygiene_pipeline run trigger --service-config-b64 <BLOB>

    # Run the extractor service against a local filesystem "bucket"
    hygiene_pipeline run extractor --object-store file --data-dir /tmp/raw \
        --source-url https://data.cityofchicago.org/resource/4ijn-s7e5.json \
        --trigger-url http://localhost:8080/clean

Command are generally structured in the form:
    <type of object> <action> <arguments>
"#
)]
struct Config {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Parser)]
enum Command {
    /// Run one of the pipeline services
    Run(commands::run::Config),
}

fn main() -> Result<(), std::io::Error> {
    // load a local .env, if any, before parsing the environment
    dotenvy::dotenv().ok();

    let config = Config::parse();

    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    tokio_runtime.block_on(async move {
        match config.command {
            Command::Run(config) => {
                init_logging(config.logging_config());
                if let Err(e) = commands::run::command(config).await {
                    error!(error = %e, "server command failed");
                    eprintln!("Server command failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    });

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = match EnvFilter::try_new(&config.log_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid log filter {:?}: {}", config.log_filter, e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
