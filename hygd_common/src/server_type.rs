use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use hyper::{Body, Request, Response};

use crate::http::HttpApiError;

/// One HTTP daemon of the pipeline (the extractor or the trigger).
#[async_trait]
pub trait HttpServerType: Debug + Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Route given HTTP request.
    ///
    /// Note that this is only called if none of the shared, common routes
    /// (e.g. `/health`) match.
    async fn route_http_request(
        &self,
        req: Request<Body>,
    ) -> Result<Response<Body>, HttpApiError>;

    /// Request cooperative shutdown of background work.
    fn shutdown(&self);

    /// Wait for background work to finish.
    ///
    /// This MUST NOT return before [`shutdown`](Self::shutdown) has been
    /// called (or the shared token cancelled).
    async fn join(self: Arc<Self>);
}
