//! The extraction engine: pulls the paginated source feed in fixed-size
//! chunks, lands NDJSON blobs plus a completion manifest in object storage,
//! and reports per-chunk telemetry and lifecycle events.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

mod engine;
mod events;
mod fault;
mod feed;
pub mod mock;

pub use engine::{Error, Extractor, RunOutcome, CHUNK_SIZE, INJECTED_DELAY, ORIGIN};
pub use events::{EventSink, EventSinkError, HttpEventSink};
pub use fault::{FaultConfig, FaultGates};
pub use feed::{FeedError, HttpSourceFeed, SourceFeed};
