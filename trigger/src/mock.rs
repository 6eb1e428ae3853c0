//! In-memory test double for the worker client.

use crate::workers::{WorkerClient, WorkerError};
use async_trait::async_trait;
use data_types::{ExtractDate, RunRequest, Stage};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Records stage invocations instead of calling anything.
#[derive(Debug, Default)]
pub struct MockWorkerClient {
    runs: Mutex<Vec<RunRequest>>,
    notifications: Mutex<Vec<(Stage, ExtractDate)>>,
    failing: AtomicBool,
}

impl MockWorkerClient {
    /// A client that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run requests forwarded so far.
    pub fn runs(&self) -> Vec<RunRequest> {
        self.runs.lock().clone()
    }

    /// Stage kickoffs so far, in call order.
    pub fn notifications(&self) -> Vec<(Stage, ExtractDate)> {
        self.notifications.lock().clone()
    }

    /// Make subsequent calls fail, simulating unreachable workers.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, stage: Stage) -> Result<(), WorkerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkerError::Status {
                stage,
                status: reqwest::StatusCode::BAD_GATEWAY,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WorkerClient for MockWorkerClient {
    async fn start_run(&self, request: &RunRequest) -> Result<(), WorkerError> {
        self.check(Stage::Extractor)?;
        self.runs.lock().push(request.clone());
        Ok(())
    }

    async fn notify(&self, stage: Stage, date: &ExtractDate) -> Result<(), WorkerError> {
        self.check(stage)?;
        self.notifications.lock().push((stage, date.clone()));
        Ok(())
    }
}
