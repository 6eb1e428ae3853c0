//! Read and write the per-(stage, date) `_manifest.json` completion marker.
//!
//! The manifest is the only cross-stage synchronization primitive: it is
//! written exactly once, at stage end, with `upload_complete = true`. Its
//! absence means "stage not done" and downstream performs zero work.

use crate::{paths::manifest_path, DeserializeSnafu, Result, SerializeSnafu, StoreSnafu};
use bytes::Bytes;
use data_types::{ExtractDate, StageManifest};
use object_store::DynObjectStore;
use observability_deps::tracing::debug;
use snafu::ResultExt;

/// Write the manifest for its `(stage_prefix, date)`.
pub async fn write_manifest(
    store: &DynObjectStore,
    stage_prefix: &str,
    manifest: &StageManifest,
) -> Result<()> {
    let body =
        serde_json::to_vec(manifest).context(SerializeSnafu { what: "stage manifest" })?;
    let path = manifest_path(stage_prefix, &manifest.date);
    store
        .put(&path, Bytes::from(body))
        .await
        .context(StoreSnafu)?;
    debug!(%path, files = manifest.files.len(), "wrote stage manifest");
    Ok(())
}

/// Read the manifest for `(stage_prefix, date)`; `None` if it does not exist.
pub async fn read_manifest(
    store: &DynObjectStore,
    stage_prefix: &str,
    date: &ExtractDate,
) -> Result<Option<StageManifest>> {
    let path = manifest_path(stage_prefix, date);
    let bytes = match store.get(&path).await {
        Ok(result) => result.bytes().await.context(StoreSnafu)?,
        Err(object_store::Error::NotFound { .. }) => return Ok(None),
        Err(source) => return Err(source).context(StoreSnafu),
    };

    serde_json::from_slice(&bytes)
        .context(DeserializeSnafu { what: "stage manifest" })
        .map(Some)
}

/// Like [`read_manifest`], but additionally gates on `upload_complete`:
/// an incomplete manifest reads as `None`, so callers treat "absent" and
/// "not finished" identically.
pub async fn completed_manifest(
    store: &DynObjectStore,
    stage_prefix: &str,
    date: &ExtractDate,
) -> Result<Option<StageManifest>> {
    Ok(read_manifest(store, stage_prefix, date)
        .await?
        .filter(|m| m.upload_complete))
}
