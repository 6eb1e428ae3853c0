use clap_blocks::logging::LoggingConfig;
use snafu::{ResultExt, Snafu};

mod extractor;
mod main;
mod trigger;

#[derive(Debug, Snafu)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[snafu(display("Error in extractor subcommand: {}", source))]
    ExtractorError { source: extractor::Error },

    #[snafu(display("Error in trigger subcommand: {}", source))]
    TriggerError { source: trigger::Error },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[clap(subcommand)]
    command: Command,
}

impl Config {
    pub fn logging_config(&self) -> &LoggingConfig {
        match &self.command {
            Command::Extractor(config) => config.run_config.logging_config(),
            Command::Trigger(config) => config.run_config.logging_config(),
        }
    }
}

#[derive(Debug, clap::Parser)]
enum Command {
    /// Run the server in extractor mode
    Extractor(extractor::Config),

    /// Run the server in trigger (orchestrator) mode
    Trigger(trigger::Config),
}

pub async fn command(config: Config) -> Result<()> {
    match config.command {
        Command::Extractor(config) => extractor::command(config).await.context(ExtractorSnafu),
        Command::Trigger(config) => trigger::command(config).await.context(TriggerSnafu),
    }
}
