//! Sinks for [`ChunkMetric`] rows.
//!
//! Telemetry is strictly best-effort: a failed insert must never fail the
//! chunk that produced it. Callers log errors from [`ChunkMetricSink::record`]
//! and move on.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use async_trait::async_trait;
use data_types::ChunkMetric;
use observability_deps::tracing::info;
use parking_lot::Mutex;
use snafu::{ensure, ResultExt, Snafu};
use std::fmt::Debug;

/// Errors inserting a metric row.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum Error {
    #[snafu(display("cannot build telemetry client: {}", source))]
    Client { source: reqwest::Error },

    #[snafu(display("error sending metric row: {}", source))]
    Request { source: reqwest::Error },

    #[snafu(display("telemetry sink returned status {}", status))]
    Status { status: reqwest::StatusCode },
}

/// An append-only destination for per-chunk metric rows.
#[async_trait]
pub trait ChunkMetricSink: Debug + Send + Sync {
    /// Append one row.
    async fn record(&self, metric: ChunkMetric) -> Result<(), Error>;
}

/// Posts each row as JSON to an HTTP ingestion endpoint.
#[derive(Debug)]
pub struct HttpMetricSink {
    client: reqwest::Client,
    url: String,
}

impl HttpMetricSink {
    /// Create a sink posting to `url`.
    pub fn new(url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, Error> {
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
impl ChunkMetricSink for HttpMetricSink {
    async fn record(&self, metric: ChunkMetric) -> Result<(), Error> {
        let response = self
            .client
            .post(&self.url)
            .json(&metric)
            .send()
            .await
            .context(RequestSnafu)?;
        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { status });
        Ok(())
    }
}

/// Writes each row to the process log instead of an external sink.
///
/// The default for deployments that have no telemetry endpoint configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMetricSink;

#[async_trait]
impl ChunkMetricSink for LoggingMetricSink {
    async fn record(&self, metric: ChunkMetric) -> Result<(), Error> {
        info!(
            offset = metric.offset,
            rows_extracted = metric.rows_extracted,
            rows_dropped = metric.rows_dropped,
            chunk_duration_seconds = metric.chunk_duration_seconds,
            delay_applied = metric.delay_applied,
            fetch_skipped = metric.fetch_skipped,
            gcs_write_skipped = metric.gcs_write_skipped,
            "chunk metric",
        );
        Ok(())
    }
}

/// Collects rows in memory; the sink used by the test suites.
#[derive(Debug, Default)]
pub struct MemoryMetricSink {
    rows: Mutex<Vec<ChunkMetric>>,
}

impl MemoryMetricSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows recorded so far.
    pub fn rows(&self) -> Vec<ChunkMetric> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl ChunkMetricSink for MemoryMetricSink {
    async fn record(&self, metric: ChunkMetric) -> Result<(), Error> {
        self.rows.lock().push(metric);
        Ok(())
    }
}
