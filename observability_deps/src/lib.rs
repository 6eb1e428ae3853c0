//! Log and trace exports for the pipeline crates.
//!
//! Every crate in this workspace logs through this re-export so that the
//! `tracing` version (and its compile-time level filters) are pinned in
//! exactly one place.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(missing_docs)]

pub use tracing;
