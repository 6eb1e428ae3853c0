//! The pipeline orchestrator.
//!
//! Routes stage-completion events to the next worker, deduplicates
//! re-deliveries per `(date, event)`, records per-stage durations, and
//! forwards run requests to the extractor.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

mod cache;
mod durations;
pub mod mock;
mod router;
mod workers;

pub use cache::{CompletionCache, MemoryCompletionCache};
pub use durations::{DurationLogError, DurationRecorder};
pub use router::{EventOutcome, PipelineRouter};
pub use workers::{
    HttpWorkerClient, ServiceMap, ServiceMapError, WorkerClient, WorkerEndpoint, WorkerError,
};
