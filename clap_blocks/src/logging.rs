//! Logging configuration.

/// CLI config for the tracing filter.
#[derive(Debug, Clone, clap::Parser)]
pub struct LoggingConfig {
    /// Logs: filter directive
    ///
    /// The rust-style filter applied to the process logs, e.g.
    /// `info` or `extractor=debug,info`.
    #[clap(
        long = "--log-filter",
        env = "LOG_FILTER",
        default_value = "info",
        action
    )]
    pub log_filter: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_to_info() {
        let config = LoggingConfig::try_parse_from(["test"]).unwrap();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn accepts_a_directive() {
        let config =
            LoggingConfig::try_parse_from(["test", "--log-filter", "extractor=debug"]).unwrap();
        assert_eq!(config.log_filter, "extractor=debug");
    }
}
