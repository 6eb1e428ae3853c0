//! NDJSON chunk encoding and object-store IO.

use crate::{paths::chunk_path, DeserializeSnafu, Result, SerializeSnafu, StoreSnafu};
use bytes::Bytes;
use data_types::ExtractDate;
use object_store::DynObjectStore;
use serde_json::Value;
use snafu::ResultExt;

/// Encode `records` as NDJSON, one record per line.
pub fn to_ndjson(records: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record).context(SerializeSnafu { what: "chunk row" })?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Decode an NDJSON blob back into records. Trailing newlines are tolerated.
pub fn from_ndjson(bytes: &[u8]) -> Result<Vec<Value>> {
    bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_slice(line).context(DeserializeSnafu { what: "chunk row" }))
        .collect()
}

/// Write the chunk starting at `offset`, returning the filename recorded in
/// the stage manifest.
pub async fn write_chunk(
    store: &DynObjectStore,
    stage_prefix: &str,
    date: &ExtractDate,
    offset: u64,
    records: &[Value],
) -> Result<String> {
    let body = to_ndjson(records)?;
    let path = chunk_path(stage_prefix, date, offset);
    store
        .put(&path, Bytes::from(body))
        .await
        .context(StoreSnafu)?;
    Ok(crate::paths::chunk_filename(offset))
}

/// Read back the chunk starting at `offset`.
pub async fn read_chunk(
    store: &DynObjectStore,
    stage_prefix: &str,
    date: &ExtractDate,
    offset: u64,
) -> Result<Vec<Value>> {
    let path = chunk_path(stage_prefix, date, offset);
    let bytes = store
        .get(&path)
        .await
        .context(StoreSnafu)?
        .bytes()
        .await
        .context(StoreSnafu)?;
    from_ndjson(&bytes)
}
