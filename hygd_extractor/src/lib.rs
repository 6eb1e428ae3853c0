//! HTTP surface of the extractor daemon.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use async_trait::async_trait;
use data_types::RunRequest;
use extractor::{Extractor, FaultConfig, FaultGates};
use hygd_common::{
    http::{read_json_body, text_response, HttpApiError},
    HttpServerType,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use observability_deps::tracing::{error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The extractor daemon: accepts extract requests, runs them as background
/// tasks, and honors cooperative shutdown.
#[derive(Debug)]
pub struct ExtractorServerType {
    engine: Arc<Extractor>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Wire an engine into an HTTP server type.
///
/// `shutdown` must be the same token the engine polls, so both the serve loop
/// and the chunk loop observe one cancellation.
pub fn create_extractor_server_type(
    engine: Arc<Extractor>,
    shutdown: CancellationToken,
) -> Arc<ExtractorServerType> {
    Arc::new(ExtractorServerType {
        engine,
        shutdown,
        tasks: Mutex::new(Vec::new()),
    })
}

#[async_trait]
impl HttpServerType for ExtractorServerType {
    fn name(&self) -> &'static str {
        "extractor"
    }

    async fn route_http_request(
        &self,
        req: Request<Body>,
    ) -> Result<Response<Body>, HttpApiError> {
        let method = req.method().clone();
        let uri_path = req.uri().path().to_string();

        match uri_path.as_str() {
            "/extract" if method == Method::POST => {
                let request: RunRequest = read_json_body(req).await?;
                info!(
                    date = %request.date,
                    max_offset = request.max_offset,
                    "accepted extract request"
                );

                let gates = FaultGates::new(FaultConfig::from(&request));
                let engine = Arc::clone(&self.engine);
                let handle = tokio::spawn(async move {
                    match engine.run(request, gates).await {
                        Ok(outcome) => info!(
                            date = %outcome.date,
                            chunks = outcome.files.len(),
                            rows_extracted = outcome.rows_extracted,
                            "extract run finished"
                        ),
                        Err(e) => error!(error = %e, "extract run aborted"),
                    }
                });

                let mut tasks = self.tasks.lock();
                tasks.retain(|t| !t.is_finished());
                tasks.push(handle);

                Ok(text_response(StatusCode::OK, "extractor started"))
            }
            "/shutdown" if method == Method::POST => {
                info!("shutdown requested over HTTP");
                self.shutdown.cancel();
                Ok(text_response(StatusCode::OK, "shutting down"))
            }
            _ => Err(HttpApiError::RouteNotFound {
                method,
                path: uri_path,
            }),
        }
    }

    fn shutdown(&self) {
        self.shutdown.cancel()
    }

    async fn join(self: Arc<Self>) {
        self.shutdown.cancelled().await;
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "extract task failed to join");
            }
        }
    }
}
