//! Extractor-specific configuration.

use std::time::Duration;

/// CLI config for the extractor service.
#[derive(Debug, Clone, clap::Parser)]
pub struct ExtractorConfig {
    /// URL of the paginated source feed, queried with `?limit=&offset=`.
    #[clap(long = "--source-url", env = "SOURCE_URL", action)]
    pub source_url: String,

    /// URL of the trigger's event ingress.
    #[clap(long = "--trigger-url", env = "TRIGGER_URL", action)]
    pub trigger_url: String,

    /// Telemetry ingestion endpoint for per-chunk metric rows.
    ///
    /// When unset, rows are written to the process log instead.
    #[clap(long = "--metrics-url", env = "METRICS_URL", action)]
    pub metrics_url: Option<String>,

    /// Per-request timeout against the source feed, in seconds.
    #[clap(
        long = "--feed-timeout-seconds",
        env = "FEED_TIMEOUT_SECONDS",
        default_value = "30",
        action
    )]
    pub feed_timeout_seconds: u64,
}

impl ExtractorConfig {
    /// The feed timeout as a [`Duration`].
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_seconds)
    }
}
