//! The hyper serve loop shared by both daemons.

use crate::{http, server_type::HttpServerType};
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server,
};
use observability_deps::tracing::{info, warn};
use snafu::{ResultExt, Snafu};
use std::{convert::Infallible, net::SocketAddr, sync::Arc};
use tokio_util::sync::CancellationToken;

/// Errors running the HTTP server.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum ServeError {
    #[snafu(display("cannot bind {}: {}", addr, source))]
    Bind {
        addr: SocketAddr,
        source: hyper::Error,
    },

    #[snafu(display("HTTP server error: {}", source))]
    Serve { source: hyper::Error },
}

/// Serve `server_type` on `addr` until `shutdown` is cancelled.
///
/// In-flight requests drain gracefully; background work is joined by the
/// caller via [`HttpServerType::join`] afterwards.
pub async fn serve(
    addr: SocketAddr,
    server_type: Arc<dyn HttpServerType>,
    shutdown: CancellationToken,
) -> Result<(), ServeError> {
    let name = server_type.name();

    let make_svc = make_service_fn(move |_conn| {
        let server_type = Arc::clone(&server_type);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let server_type = Arc::clone(&server_type);
                async move { Ok::<_, Infallible>(route(server_type, req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .context(BindSnafu { addr })?
        .serve(make_svc);
    info!(%addr, server = name, "HTTP server listening");

    server
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context(ServeSnafu)?;

    info!(server = name, "HTTP server shut down");
    Ok(())
}

async fn route(server_type: Arc<dyn HttpServerType>, req: Request<Body>) -> Response<Body> {
    if req.method() == Method::GET && req.uri().path() == "/health" {
        return http::health_response();
    }

    match server_type.route_http_request(req).await {
        Ok(response) => response,
        Err(e) => {
            warn!(server = server_type.name(), error = %e, "request failed");
            e.response()
        }
    }
}
