//! Building blocks for the services' command line interfaces.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod extractor;
pub mod logging;
pub mod object_store;
pub mod run_config;
pub mod trigger;
