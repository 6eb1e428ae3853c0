//! The event routing table and its dedup discipline.

use crate::{
    cache::CompletionCache,
    durations::DurationRecorder,
    workers::{WorkerClient, WorkerError},
};
use data_types::{EventKind, ExtractDate, PipelineEvent, RunRequest, Stage};
use observability_deps::tracing::{error, info, warn};
use std::sync::Arc;

/// What the router did with an event. The HTTP layer renders this into the
/// response body; every outcome is a `200` to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// An informational event was recorded; nothing to forward.
    Started,
    /// The date was forwarded to the given stage.
    Forwarded(Stage),
    /// The `(date, event)` pair was already routed.
    Duplicate,
    /// The pipeline reached its terminal stage for this date.
    Terminal,
    /// The event is not part of the routing table.
    Dropped,
}

impl EventOutcome {
    /// Human-readable rendering for response bodies.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started => "event recorded",
            Self::Forwarded(_) => "forwarded to next stage",
            Self::Duplicate => "duplicate ignored",
            Self::Terminal => "pipeline complete",
            Self::Dropped => "event ignored",
        }
    }
}

/// Routes pipeline events per date:
///
/// ```text
/// extractor_started    -> (informational)
/// extractor_completed  -> cleaner
/// cleaner_completed    -> parquet loader       (json loader when enabled)
/// loader_json_completed-> parquet loader       (only when enabled)
/// loader_parquet_completed -> terminal
/// ```
///
/// The pipeline graph is strictly a DAG; the only coupling between stages is
/// the worker URLs injected at startup.
#[derive(Debug)]
pub struct PipelineRouter {
    cache: Arc<dyn CompletionCache>,
    workers: Arc<dyn WorkerClient>,
    durations: DurationRecorder,
    json_branch: bool,
}

impl PipelineRouter {
    /// Create a router.
    pub fn new(
        cache: Arc<dyn CompletionCache>,
        workers: Arc<dyn WorkerClient>,
        durations: DurationRecorder,
        json_branch: bool,
    ) -> Self {
        Self {
            cache,
            workers,
            durations,
            json_branch,
        }
    }

    /// Forward `request` to the extractor, starting a pipeline run.
    pub async fn start_run(&self, request: &RunRequest) -> Result<(), WorkerError> {
        info!(
            date = %request.date,
            max_offset = request.max_offset,
            "starting pipeline run"
        );
        self.workers.start_run(request).await
    }

    /// Route one event. Never fails: forward errors are logged, and recovery
    /// is a purge plus a manual re-trigger.
    pub async fn handle_event(&self, event: &PipelineEvent) -> EventOutcome {
        let kind = event.event;

        if kind == EventKind::Unknown {
            warn!(origin = %event.origin, date = %event.date, "unknown pipeline event dropped");
            return EventOutcome::Dropped;
        }

        // check-and-insert is atomic; re-deliveries stop here
        if !self.cache.insert(&event.date, kind) {
            info!(event = %kind, date = %event.date, "duplicate event ignored");
            return EventOutcome::Duplicate;
        }

        if let Some(duration) = event.duration {
            if let Err(e) = self
                .durations
                .append(&event.origin, &event.date, kind, duration)
            {
                warn!(error = %e, origin = %event.origin, "failed to append duration log");
            }
        }

        match kind {
            EventKind::ExtractorStarted => {
                info!(date = %event.date, "extractor reported run start");
                EventOutcome::Started
            }
            EventKind::ExtractorCompleted => self.forward(Stage::Cleaner, &event.date).await,
            EventKind::CleanerCompleted => {
                let next = if self.json_branch {
                    Stage::LoaderJson
                } else {
                    Stage::LoaderParquet
                };
                self.forward(next, &event.date).await
            }
            EventKind::LoaderJsonCompleted => {
                if self.json_branch {
                    self.forward(Stage::LoaderParquet, &event.date).await
                } else {
                    info!(date = %event.date, "json loader branch disabled, event not forwarded");
                    EventOutcome::Dropped
                }
            }
            EventKind::LoaderParquetCompleted => {
                info!(
                    date = %event.date,
                    duration = ?event.duration,
                    "pipeline complete"
                );
                EventOutcome::Terminal
            }
            EventKind::Unknown => EventOutcome::Dropped,
        }
    }

    /// Empty the completion cache.
    pub fn purge(&self) {
        self.cache.purge();
        info!("completion cache purged");
    }

    async fn forward(&self, stage: Stage, date: &ExtractDate) -> EventOutcome {
        match self.workers.notify(stage, date).await {
            Ok(()) => info!(%stage, %date, "forwarded date to next stage"),
            // no automatic retry: operators purge and re-trigger
            Err(e) => error!(%stage, %date, error = %e, "failed to forward to next stage"),
        }
        EventOutcome::Forwarded(stage)
    }
}
