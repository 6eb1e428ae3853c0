//! In-memory test doubles for the engine's collaborators.

use crate::{
    events::{EventSink, EventSinkError},
    feed::{FeedError, SourceFeed},
};
use async_trait::async_trait;
use data_types::PipelineEvent;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// A scripted feed keyed by offset.
///
/// Offsets without a configured page read as empty, i.e. exhausted.
#[derive(Debug, Default)]
pub struct MockSourceFeed {
    pages: Mutex<BTreeMap<u64, Vec<Value>>>,
    transient_failures: Mutex<BTreeMap<u64, usize>>,
    fetches: Mutex<Vec<u64>>,
}

impl MockSourceFeed {
    /// An empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the page returned at `offset`.
    pub fn with_page(self, offset: u64, records: Vec<Value>) -> Self {
        self.pages.lock().insert(offset, records);
        self
    }

    /// Make the next `times` fetches of `offset` fail with a retryable error.
    pub fn fail_transiently(&self, offset: u64, times: usize) {
        self.transient_failures.lock().insert(offset, times);
    }

    /// Every offset fetched so far, in call order (including failed calls).
    pub fn fetches(&self) -> Vec<u64> {
        self.fetches.lock().clone()
    }
}

#[async_trait]
impl SourceFeed for MockSourceFeed {
    async fn fetch_page(&self, offset: u64, _limit: u64) -> Result<Vec<Value>, FeedError> {
        self.fetches.lock().push(offset);

        if let Some(remaining) = self.transient_failures.lock().get_mut(&offset) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FeedError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                });
            }
        }

        Ok(self.pages.lock().get(&offset).cloned().unwrap_or_default())
    }
}

/// Captures posted lifecycle events; can be toggled to fail every post.
#[derive(Debug, Default)]
pub struct MockEventSink {
    events: Mutex<Vec<PipelineEvent>>,
    failing: AtomicBool,
}

impl MockEventSink {
    /// An accepting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event posted so far (failed posts are not recorded).
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// Make subsequent posts fail, simulating an unreachable orchestrator.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn post(&self, event: &PipelineEvent) -> Result<(), EventSinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EventSinkError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
            });
        }
        self.events.lock().push(event.clone());
        Ok(())
    }
}
