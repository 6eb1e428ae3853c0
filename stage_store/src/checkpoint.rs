//! Durable storage for the extractor's resume point.

use crate::{paths::checkpoint_path, DeserializeSnafu, Result, SerializeSnafu, StoreSnafu};
use bytes::Bytes;
use data_types::Checkpoint;
use object_store::DynObjectStore;
use observability_deps::tracing::debug;
use snafu::ResultExt;
use std::sync::Arc;

/// Reads and writes the single global `last_checkpoint.json` object.
///
/// The checkpoint only moves forward after a chunk has durably landed, so a
/// crashed or fault-skipped chunk is re-fetched by the next run.
#[derive(Debug)]
pub struct CheckpointStore {
    store: Arc<DynObjectStore>,
}

impl CheckpointStore {
    /// Create a checkpoint store on top of `store`.
    pub fn new(store: Arc<DynObjectStore>) -> Self {
        Self { store }
    }

    /// The checkpoint to resume from; a missing object reads as offset 0.
    pub async fn get(&self) -> Result<Checkpoint> {
        let bytes = match self.store.get(&checkpoint_path()).await {
            Ok(result) => result.bytes().await.context(StoreSnafu)?,
            Err(object_store::Error::NotFound { .. }) => return Ok(Checkpoint::default()),
            Err(source) => return Err(source).context(StoreSnafu),
        };

        serde_json::from_slice(&bytes).context(DeserializeSnafu { what: "checkpoint" })
    }

    /// Persist `checkpoint`, replacing the previous value.
    pub async fn put(&self, checkpoint: Checkpoint) -> Result<()> {
        let body =
            serde_json::to_vec(&checkpoint).context(SerializeSnafu { what: "checkpoint" })?;
        self.store
            .put(&checkpoint_path(), Bytes::from(body))
            .await
            .context(StoreSnafu)?;
        debug!(last_offset = checkpoint.last_offset, "persisted checkpoint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn missing_checkpoint_reads_as_zero() {
        let store = CheckpointStore::new(Arc::new(InMemory::new()));
        assert_eq!(store.get().await.unwrap(), Checkpoint::default());
    }

    #[tokio::test]
    async fn checkpoint_round_trip() {
        let store = CheckpointStore::new(Arc::new(InMemory::new()));

        store.put(Checkpoint { last_offset: 1000 }).await.unwrap();
        assert_eq!(store.get().await.unwrap().last_offset, 1000);

        // last-writer-wins replacement
        store.put(Checkpoint { last_offset: 2000 }).await.unwrap();
        assert_eq!(store.get().await.unwrap().last_offset, 2000);
    }
}
