//! Trigger-specific configuration.

use std::{path::PathBuf, time::Duration};

/// CLI config for the trigger (orchestrator) service.
#[derive(Debug, Clone, clap::Parser)]
pub struct TriggerConfig {
    /// Worker endpoints as base64 over a JSON object, e.g.
    /// `{"cleaner": {"url": "http://cleaner.internal/clean"}}`.
    #[clap(long = "--service-config-b64", env = "SERVICE_CONFIG_B64", action)]
    pub service_config_b64: String,

    /// Route cleaned dates through the JSON loader before the parquet loader.
    #[clap(long = "--enable-json-loader", env = "JSON_LOADER_ENABLED", action)]
    pub enable_json_loader: bool,

    /// Directory the per-origin duration logs land in.
    #[clap(
        long = "--durations-dir",
        env = "DURATIONS_DIR",
        default_value = "durations",
        action
    )]
    pub durations_dir: PathBuf,

    /// Per-request timeout calling the stage workers, in seconds.
    #[clap(
        long = "--worker-timeout-seconds",
        env = "WORKER_TIMEOUT_SECONDS",
        default_value = "30",
        action
    )]
    pub worker_timeout_seconds: u64,
}

impl TriggerConfig {
    /// The worker timeout as a [`Duration`].
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_flags_and_defaults() {
        let config =
            TriggerConfig::try_parse_from(["test", "--service-config-b64", "e30="]).unwrap();
        assert!(!config.enable_json_loader);
        assert_eq!(config.durations_dir, PathBuf::from("durations"));
        assert_eq!(config.worker_timeout(), Duration::from_secs(30));

        let config = TriggerConfig::try_parse_from([
            "test",
            "--service-config-b64",
            "e30=",
            "--enable-json-loader",
        ])
        .unwrap();
        assert!(config.enable_json_loader);
    }
}
