//! Request parsing, response building and error mapping.

use hyper::{header::CONTENT_TYPE, Body, Method, Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use snafu::{ResultExt, Snafu};

/// Errors a request handler can surface to the client.
///
/// Well-formed pipeline events always get a `200`; these map the remaining
/// cases: malformed bodies to `400`, unknown routes to `404`, and worker
/// transport failures to `502`.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum HttpApiError {
    #[snafu(display("malformed request body: {}", message))]
    BadRequest { message: String },

    #[snafu(display("no handler for {} {}", method, path))]
    RouteNotFound { method: Method, path: String },

    #[snafu(display("cannot read request body: {}", source))]
    ReadBody { source: hyper::Error },

    #[snafu(display("downstream worker unreachable: {}", message))]
    BadGateway { message: String },
}

impl HttpApiError {
    /// The status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::ReadBody { .. } => StatusCode::BAD_REQUEST,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Render as a JSON error response.
    pub fn response(&self) -> Response<Body> {
        json_response(self.status(), &serde_json::json!({ "error": self.to_string() }))
    }

    /// Shorthand for the 404 case.
    pub fn route_not_found(req: &Request<Body>) -> Self {
        Self::RouteNotFound {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
        }
    }
}

/// Build a JSON response from any serializable body.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .unwrap(),
        Err(_) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::empty())
            .unwrap(),
    }
}

/// Build a plain-text response.
pub fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(body))
        .unwrap()
}

/// Read and deserialize a JSON request body.
pub async fn read_json_body<T: DeserializeOwned>(req: Request<Body>) -> Result<T, HttpApiError> {
    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .context(ReadBodySnafu)?;
    serde_json::from_slice(&bytes).map_err(|e| HttpApiError::BadRequest {
        message: e.to_string(),
    })
}

/// The `{"status":"ok","time":…}` liveness payload both daemons serve.
pub fn health_response() -> Response<Body> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "time": chrono::Utc::now().to_rfc3339(),
        }),
    )
}
