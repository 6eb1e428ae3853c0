//! The durable layout every pipeline stage shares: NDJSON chunk blobs, the
//! per-(stage, date) `_manifest.json` completion marker, and the extractor's
//! global checkpoint object.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use snafu::Snafu;

mod checkpoint;
mod chunk;
mod manifest;
mod paths;

pub use checkpoint::CheckpointStore;
pub use chunk::{from_ndjson, read_chunk, to_ndjson, write_chunk};
pub use manifest::{completed_manifest, read_manifest, write_manifest};
pub use paths::{
    chunk_filename, chunk_path, checkpoint_path, date_prefix, manifest_path, CHECKPOINT_OBJECT,
    CLEAN_DATA_PREFIX, MANIFEST_OBJECT, RAW_DATA_PREFIX,
};

/// Errors talking to the stage layout.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[allow(missing_docs)]
pub enum Error {
    #[snafu(display("object store operation failed: {}", source))]
    Store { source: object_store::Error },

    #[snafu(display("cannot serialize {}: {}", what, source))]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },

    #[snafu(display("cannot deserialize {}: {}", what, source))]
    Deserialize {
        what: &'static str,
        source: serde_json::Error,
    },
}

/// Convenience result alias for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
