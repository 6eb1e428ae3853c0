//! HTTP surface of the trigger (orchestrator) daemon.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use async_trait::async_trait;
use data_types::{PipelineEvent, RunRequest};
use hygd_common::{
    http::{read_json_body, text_response, HttpApiError},
    HttpServerType,
};
use hyper::{Body, Method, Request, Response, StatusCode};
use observability_deps::tracing::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trigger::PipelineRouter;

/// The trigger daemon: run kickoff, event ingress, cache purge.
#[derive(Debug)]
pub struct TriggerServerType {
    router: Arc<PipelineRouter>,
    shutdown: CancellationToken,
}

/// Wire a router into an HTTP server type.
pub fn create_trigger_server_type(
    router: Arc<PipelineRouter>,
    shutdown: CancellationToken,
) -> Arc<TriggerServerType> {
    Arc::new(TriggerServerType { router, shutdown })
}

#[async_trait]
impl HttpServerType for TriggerServerType {
    fn name(&self) -> &'static str {
        "trigger"
    }

    async fn route_http_request(
        &self,
        req: Request<Body>,
    ) -> Result<Response<Body>, HttpApiError> {
        let method = req.method().clone();
        let uri_path = req.uri().path().to_string();

        match uri_path.as_str() {
            "/run" if method == Method::POST => {
                let request: RunRequest = read_json_body(req).await?;
                self.router
                    .start_run(&request)
                    .await
                    .map_err(|e| HttpApiError::BadGateway {
                        message: e.to_string(),
                    })?;
                Ok(text_response(StatusCode::OK, "pipeline started"))
            }
            // historically misnamed: this is the generic event ingress
            "/clean" if method == Method::POST => {
                let event: PipelineEvent = read_json_body(req).await?;
                let outcome = self.router.handle_event(&event).await;
                Ok(text_response(StatusCode::OK, outcome.description()))
            }
            "/purge" if method == Method::POST => {
                self.router.purge();
                Ok(text_response(StatusCode::OK, "completion cache purged"))
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
        info!("trigger shut down");
    }
}
