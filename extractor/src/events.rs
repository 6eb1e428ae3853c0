//! Posting lifecycle events to the pipeline orchestrator.

use async_trait::async_trait;
use data_types::PipelineEvent;
use snafu::{ensure, ResultExt, Snafu};
use std::fmt::Debug;

/// Errors posting a pipeline event.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum EventSinkError {
    #[snafu(display("cannot build event client: {}", source))]
    Client { source: reqwest::Error },

    #[snafu(display("error posting pipeline event: {}", source))]
    Request { source: reqwest::Error },

    #[snafu(display("orchestrator returned status {}", status))]
    Status { status: reqwest::StatusCode },
}

/// Destination for lifecycle events.
///
/// Sends are best-effort: a failed post is logged by the caller and never
/// rolls back durable work. The stage manifest stays the authoritative
/// completion signal.
#[async_trait]
pub trait EventSink: Debug + Send + Sync {
    /// Post one event.
    async fn post(&self, event: &PipelineEvent) -> Result<(), EventSinkError>;
}

/// [`EventSink`] posting JSON to the orchestrator's event ingress.
#[derive(Debug)]
pub struct HttpEventSink {
    client: reqwest::Client,
    url: String,
}

impl HttpEventSink {
    /// Create a sink posting to `url` with a per-request `timeout`.
    pub fn new(
        url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, EventSinkError> {
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
impl EventSink for HttpEventSink {
    async fn post(&self, event: &PipelineEvent) -> Result<(), EventSinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .context(RequestSnafu)?;
        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { status });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_types::{EventKind, ExtractDate};

    #[tokio::test]
    async fn posts_events_as_json() {
        let mock = mockito::mock("POST", "/clean")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "event": "extractor_started",
                "origin": "extractor",
                "date": "2025-03-30",
            })))
            .with_status(200)
            .create();

        let sink = HttpEventSink::new(
            format!("{}/clean", mockito::server_url()),
            std::time::Duration::from_secs(5),
        )
        .unwrap();

        let event = PipelineEvent::new(
            EventKind::ExtractorStarted,
            "extractor",
            ExtractDate::new("2025-03-30").unwrap(),
            Utc::now(),
        );
        sink.post(&event).await.unwrap();
        mock.assert();
    }
}
