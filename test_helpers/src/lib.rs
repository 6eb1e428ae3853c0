//! Helpers shared by the test suites of the pipeline crates.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static LOG_SETUP: Once = Once::new();

/// Enables debug logging if the `RUST_LOG` environment variable is set.
///
/// Typical usage is to call it at the start of every test that produces
/// interesting log output, so `RUST_LOG=debug cargo test -p <crate>` shows it.
pub fn maybe_start_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        start_logging()
    }
}

/// Unconditionally install the test log subscriber (once per process).
pub fn start_logging() {
    LOG_SETUP.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Asserts that `haystack` contains `needle`, with a readable failure.
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {{
        let haystack = &$haystack;
        let needle = &$needle;
        assert!(
            haystack.contains(&needle[..]),
            "could not find {:?} in {:?}",
            needle,
            haystack,
        );
    }};
}

/// A fresh temporary directory that lives as long as the returned guard.
pub fn tmp_dir() -> std::io::Result<tempfile::TempDir> {
    tempfile::Builder::new()
        .prefix("pipeline-test")
        .tempdir()
}

#[cfg(test)]
mod tests {
    #[test]
    fn assert_contains_matches() {
        assert_contains!("duplicate ignored", "duplicate");
    }

    #[test]
    fn tmp_dir_is_writable() {
        let dir = super::tmp_dir().unwrap();
        std::fs::write(dir.path().join("probe"), b"x").unwrap();
    }
}
