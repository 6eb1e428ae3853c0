//! Shared HTTP plumbing for the pipeline daemons: the server-type trait, the
//! hyper serve loop with graceful shutdown, common routes and error mapping.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod http;
mod serve;
mod server_type;

pub use serve::{serve, ServeError};
pub use server_type::HttpServerType;
