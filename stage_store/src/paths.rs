//! Path construction for the stage layout.
//!
//! All keys are built here so the layout is defined in exactly one place:
//!
//! ```text
//! raw-data/{date}/offset_{N}.json
//! raw-data/{date}/_manifest.json
//! clean-data/{date}/...
//! last_checkpoint.json
//! ```

use data_types::ExtractDate;
use object_store::path::Path;

/// Prefix the extractor lands raw chunks under.
pub const RAW_DATA_PREFIX: &str = "raw-data";

/// Prefix downstream cleaned outputs land under.
pub const CLEAN_DATA_PREFIX: &str = "clean-data";

/// The extractor's resume point. Not scoped by date.
pub const CHECKPOINT_OBJECT: &str = "last_checkpoint.json";

/// The per-(stage, date) completion marker filename.
pub const MANIFEST_OBJECT: &str = "_manifest.json";

/// Filename of the chunk starting at `offset`.
pub fn chunk_filename(offset: u64) -> String {
    format!("offset_{}.json", offset)
}

/// Full key of the chunk starting at `offset` for `date` under `stage_prefix`.
pub fn chunk_path(stage_prefix: &str, date: &ExtractDate, offset: u64) -> Path {
    Path::from(format!(
        "{}/{}/{}",
        stage_prefix,
        date,
        chunk_filename(offset)
    ))
}

/// The prefix all objects of `(stage_prefix, date)` share.
pub fn date_prefix(stage_prefix: &str, date: &ExtractDate) -> Path {
    Path::from(format!("{}/{}", stage_prefix, date))
}

/// Full key of the manifest for `(stage_prefix, date)`.
pub fn manifest_path(stage_prefix: &str, date: &ExtractDate) -> Path {
    Path::from(format!("{}/{}/{}", stage_prefix, date, MANIFEST_OBJECT))
}

/// Full key of the extractor checkpoint.
pub fn checkpoint_path() -> Path {
    Path::from(CHECKPOINT_OBJECT)
}
