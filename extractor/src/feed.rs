//! Client for the upstream paginated feed.

use async_trait::async_trait;
use serde_json::Value;
use snafu::{ensure, ResultExt, Snafu};
use std::{fmt::Debug, time::Duration};

/// Errors fetching a page from the source feed.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum FeedError {
    #[snafu(display("cannot build feed client: {}", source))]
    Client { source: reqwest::Error },

    #[snafu(display("error sending feed request: {}", source))]
    Request { source: reqwest::Error },

    #[snafu(display("feed returned status {}", status))]
    Status { status: reqwest::StatusCode },

    #[snafu(display("error reading feed body: {}", source))]
    Body { source: reqwest::Error },

    #[snafu(display("feed body is not valid JSON: {}", source))]
    Parse { source: serde_json::Error },

    #[snafu(display("feed body is not a JSON array"))]
    NotAnArray,
}

impl FeedError {
    /// Whether retrying the same request can plausibly succeed.
    ///
    /// Only socket-level failures and 5xx responses qualify; a 4xx or a
    /// malformed body is deterministic and breaks the run instead.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { .. } | Self::Body { .. } => true,
            Self::Status { status } => status.is_server_error(),
            Self::Client { .. } | Self::Parse { .. } | Self::NotAnArray => false,
        }
    }
}

/// One page of the upstream feed.
///
/// An empty page signals exhaustion; the engine terminates the run on it.
#[async_trait]
pub trait SourceFeed: Debug + Send + Sync {
    /// Fetch `limit` records starting at `offset`.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Value>, FeedError>;
}

/// [`SourceFeed`] over the real `?limit=&offset=` REST endpoint.
#[derive(Debug)]
pub struct HttpSourceFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpSourceFeed {
    /// Create a feed client for `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(ClientSnafu)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SourceFeed for HttpSourceFeed {
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<Value>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .context(RequestSnafu)?;

        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { status });

        let bytes = response.bytes().await.context(BodySnafu)?;
        let body: Value = serde_json::from_slice(&bytes).context(ParseSnafu)?;
        match body {
            Value::Array(records) => Ok(records),
            _ => NotAnArraySnafu.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn fetches_a_page() {
        let mock = mockito::mock("GET", "/feed-page")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1000".into()),
                Matcher::UrlEncoded("offset".into(), "2000".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"inspection_id": 1}, {"inspection_id": 2}]"#)
            .create();

        let feed = HttpSourceFeed::new(
            format!("{}/feed-page", mockito::server_url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let page = feed.fetch_page(2000, 1000).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0]["inspection_id"], 1);
        mock.assert();
    }

    #[tokio::test]
    async fn empty_array_is_a_valid_page() {
        let _mock = mockito::mock("GET", "/feed-empty")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create();

        let feed = HttpSourceFeed::new(
            format!("{}/feed-empty", mockito::server_url()),
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(feed.fetch_page(0, 1000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let _mock = mockito::mock("GET", "/feed-5xx")
            .match_query(Matcher::Any)
            .with_status(503)
            .create();

        let feed = HttpSourceFeed::new(
            format!("{}/feed-5xx", mockito::server_url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = feed.fetch_page(0, 1000).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn client_error_is_fatal() {
        let _mock = mockito::mock("GET", "/feed-4xx")
            .match_query(Matcher::Any)
            .with_status(404)
            .create();

        let feed = HttpSourceFeed::new(
            format!("{}/feed-4xx", mockito::server_url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = feed.fetch_page(0, 1000).await.unwrap_err();
        assert!(matches!(err, FeedError::Status { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn non_array_body_is_fatal() {
        let _mock = mockito::mock("GET", "/feed-object")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error": "quota exceeded"}"#)
            .create();

        let feed = HttpSourceFeed::new(
            format!("{}/feed-object", mockito::server_url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = feed.fetch_page(0, 1000).await.unwrap_err();
        assert!(matches!(err, FeedError::NotAnArray));
        assert!(!err.is_transient());
    }
}
