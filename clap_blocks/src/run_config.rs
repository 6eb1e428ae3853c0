//! The config block every service shares.

use crate::{logging::LoggingConfig, object_store::ObjectStoreConfig};
use std::net::SocketAddr;

/// CLI config shared by every `run` subcommand.
#[derive(Debug, Clone, clap::Parser)]
pub struct RunConfig {
    #[clap(flatten)]
    pub(crate) logging_config: LoggingConfig,

    /// Address on which the HTTP API listens.
    #[clap(
        long = "--api-bind",
        env = "API_BIND",
        default_value = "127.0.0.1:8080",
        action
    )]
    pub http_bind_address: SocketAddr,

    #[clap(flatten)]
    pub(crate) object_store_config: ObjectStoreConfig,
}

impl RunConfig {
    /// Get a reference to the logging config.
    pub fn logging_config(&self) -> &LoggingConfig {
        &self.logging_config
    }

    /// Get a reference to the object store config.
    pub fn object_store_config(&self) -> &ObjectStoreConfig {
        &self.object_store_config
    }
}
