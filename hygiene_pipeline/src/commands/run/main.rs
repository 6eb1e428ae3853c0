//! Common serve-and-shutdown loop for the pipeline services.

use hygd_common::{serve, HttpServerType, ServeError};
use observability_deps::tracing::{error, info};
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP server error: {0}")]
    Serve(#[from] ServeError),
}

/// Serve `server_type` until SIGINT or an explicit shutdown, then join its
/// background work.
pub async fn main(
    addr: SocketAddr,
    server_type: Arc<dyn HttpServerType>,
    shutdown: CancellationToken,
) -> Result<(), Error> {
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("SIGINT received, shutting down");
                signal_token.cancel();
            }
            Err(e) => error!(error = %e, "cannot listen for shutdown signal"),
        }
    });

    serve(addr, Arc::clone(&server_type), shutdown).await?;
    server_type.join().await;
    Ok(())
}
