//! The chunked extraction loop.

use crate::{
    events::EventSink,
    fault::FaultGates,
    feed::{FeedError, SourceFeed},
};
use backoff::{Backoff, BackoffConfig, RetryError};
use data_types::{
    Checkpoint, ChunkMetric, EventKind, ExtractDate, PipelineEvent, RunRequest, StageManifest,
};
use hyg_time::TimeProvider;
use object_store::DynObjectStore;
use observability_deps::tracing::{error, info, warn};
use snafu::{ResultExt, Snafu};
use stage_store::{write_chunk, write_manifest, CheckpointStore, RAW_DATA_PREFIX};
use std::{ops::ControlFlow, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

/// Records fetched per chunk, and therefore the offset stride.
pub const CHUNK_SIZE: u64 = 1000;

/// Sleep applied when the delay gate fires.
pub const INJECTED_DELAY: Duration = Duration::from_secs(2);

/// The origin string this worker stamps on its events.
pub const ORIGIN: &str = "extractor";

/// Errors that abort a run.
///
/// An aborted run leaves no manifest and posts no completion event; the
/// checkpoint already covers every durably written chunk, so the next run
/// resumes at the first unwritten offset.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum Error {
    #[snafu(display("cannot read checkpoint: {}", source))]
    ReadCheckpoint { source: stage_store::Error },

    #[snafu(display("feed fetch at offset {} failed: {}", offset, source))]
    Fetch {
        offset: u64,
        source: RetryError<FeedError>,
    },

    #[snafu(display("feed page at offset {} is unusable: {}", offset, source))]
    Page { offset: u64, source: FeedError },

    #[snafu(display("cannot write chunk at offset {}: {}", offset, source))]
    WriteChunk {
        offset: u64,
        source: stage_store::Error,
    },

    #[snafu(display("cannot advance checkpoint to {}: {}", last_offset, source))]
    WriteCheckpoint {
        last_offset: u64,
        source: stage_store::Error,
    },

    #[snafu(display("cannot write manifest for {}: {}", date, source))]
    WriteManifest {
        date: ExtractDate,
        source: stage_store::Error,
    },
}

/// Summary of one completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// The date that was extracted.
    pub date: ExtractDate,
    /// Filenames written this run, in production order.
    pub files: Vec<String>,
    /// Rows written across all chunks of this run.
    pub rows_extracted: u64,
    /// Rows discarded by the row-drop gate this run.
    pub rows_dropped: u64,
    /// Chunks attempted, including fault-skipped ones.
    pub chunks_attempted: u64,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The extraction engine.
///
/// Each [`run`](Self::run) processes chunks strictly sequentially by ascending
/// offset; the checkpoint is a scalar, so that ordering is load-bearing.
/// Concurrent runs are tolerated only for disjoint dates; two runs for the
/// same date are undefined behavior.
#[derive(Debug)]
pub struct Extractor {
    feed: Arc<dyn SourceFeed>,
    store: Arc<DynObjectStore>,
    checkpoints: CheckpointStore,
    metrics: Arc<dyn telemetry::ChunkMetricSink>,
    events: Arc<dyn EventSink>,
    time_provider: Arc<dyn TimeProvider>,
    backoff_config: BackoffConfig,
    shutdown: CancellationToken,
}

impl Extractor {
    /// Create an engine over the given collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        feed: Arc<dyn SourceFeed>,
        store: Arc<DynObjectStore>,
        metrics: Arc<dyn telemetry::ChunkMetricSink>,
        events: Arc<dyn EventSink>,
        time_provider: Arc<dyn TimeProvider>,
        backoff_config: BackoffConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let checkpoints = CheckpointStore::new(Arc::clone(&store));
        Self {
            feed,
            store,
            checkpoints,
            metrics,
            events,
            time_provider,
            backoff_config,
            shutdown,
        }
    }

    /// The cooperative shutdown token; cancelling it ends the current run
    /// after the in-flight chunk.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run one extraction for `request.date`.
    pub async fn run(
        &self,
        request: RunRequest,
        mut gates: FaultGates,
    ) -> Result<RunOutcome, Error> {
        let date = request.date.clone();
        let run_started = self.time_provider.now();

        self.post_event(PipelineEvent::new(
            EventKind::ExtractorStarted,
            ORIGIN,
            date.clone(),
            run_started.date_time(),
        ))
        .await;

        let offset0 = self
            .checkpoints
            .get()
            .await
            .context(ReadCheckpointSnafu)?
            .last_offset;

        info!(
            %date,
            offset0,
            max_offset = request.max_offset,
            "starting extraction run"
        );

        let mut offset = offset0;
        let mut files = Vec::new();
        let mut rows_extracted = 0u64;
        let mut rows_dropped = 0u64;
        let mut chunks_attempted = 0u64;

        loop {
            if self.shutdown.is_cancelled() {
                info!(%date, offset, "shutdown requested, ending run");
                break;
            }
            if request.max_offset > 0 && offset >= offset0.saturating_add(request.max_offset) {
                info!(%date, offset, "reached max_offset bound, ending run");
                break;
            }

            let chunk_started = self.time_provider.now();
            chunks_attempted += 1;

            // Fault gate: simulated upstream API failure. The iteration
            // offset advances but the checkpoint does not, so the next run
            // re-fetches this chunk.
            if gates.skip_fetch() {
                warn!(%date, offset, "injected API failure, skipping fetch");
                self.record_metric(self.metric(offset, chunk_started, 0, 0, false, true, false))
                    .await;
                offset += CHUNK_SIZE;
                continue;
            }

            let page = self.fetch_with_retry(offset).await?;
            if page.is_empty() {
                info!(%date, offset, "feed exhausted");
                break;
            }

            let mut retained = Vec::with_capacity(page.len());
            let mut dropped = 0u64;
            for record in page {
                if gates.drop_row() {
                    dropped += 1;
                } else {
                    retained.push(record);
                }
            }

            // Fault gate: simulated object-store failure. Nothing is stored,
            // so the metric reports zero extracted rows; the drops already
            // happened and are accounted for.
            if gates.skip_store_write() {
                warn!(%date, offset, "injected store failure, skipping chunk write");
                self.record_metric(self.metric(
                    offset,
                    chunk_started,
                    0,
                    dropped,
                    false,
                    false,
                    true,
                ))
                .await;
                rows_dropped += dropped;
                offset += CHUNK_SIZE;
                continue;
            }

            let delay_applied = gates.inject_delay();
            if delay_applied {
                tokio::time::sleep(INJECTED_DELAY).await;
            }

            let filename = write_chunk(&*self.store, RAW_DATA_PREFIX, &date, offset, &retained)
                .await
                .context(WriteChunkSnafu { offset })?;
            files.push(filename);

            self.record_metric(self.metric(
                offset,
                chunk_started,
                retained.len() as u64,
                dropped,
                delay_applied,
                false,
                false,
            ))
            .await;

            rows_extracted += retained.len() as u64;
            rows_dropped += dropped;

            // Only durable success moves the checkpoint forward.
            offset += CHUNK_SIZE;
            self.checkpoints
                .put(Checkpoint {
                    last_offset: offset,
                })
                .await
                .context(WriteCheckpointSnafu {
                    last_offset: offset,
                })?;
        }

        let manifest = StageManifest {
            date: date.clone(),
            files: files.clone(),
            upload_complete: true,
        };
        write_manifest(&*self.store, RAW_DATA_PREFIX, &manifest)
            .await
            .context(WriteManifestSnafu { date: date.clone() })?;

        let finished = self.time_provider.now();
        let duration_seconds = finished
            .checked_duration_since(run_started)
            .unwrap_or_default()
            .as_secs_f64();

        self.post_event(
            PipelineEvent::new(
                EventKind::ExtractorCompleted,
                ORIGIN,
                date.clone(),
                finished.date_time(),
            )
            .with_duration(duration_seconds),
        )
        .await;

        info!(
            %date,
            chunks = files.len(),
            rows_extracted,
            rows_dropped,
            duration_seconds,
            "extraction run complete"
        );

        Ok(RunOutcome {
            date,
            files,
            rows_extracted,
            rows_dropped,
            chunks_attempted,
            duration_seconds,
        })
    }

    async fn fetch_with_retry(&self, offset: u64) -> Result<Vec<serde_json::Value>, Error> {
        let result = Backoff::new(&self.backoff_config)
            .retry_with_backoff("source feed page", || {
                let feed = Arc::clone(&self.feed);
                async move {
                    match feed.fetch_page(offset, CHUNK_SIZE).await {
                        Ok(page) => ControlFlow::Break(Ok(page)),
                        Err(e) if e.is_transient() => ControlFlow::Continue(e),
                        Err(e) => ControlFlow::Break(Err(e)),
                    }
                }
            })
            .await;

        match result {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(source)) => Err(Error::Page { offset, source }),
            Err(source) => Err(Error::Fetch { offset, source }),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn metric(
        &self,
        offset: u64,
        chunk_started: hyg_time::Time,
        rows_extracted: u64,
        rows_dropped: u64,
        delay_applied: bool,
        fetch_skipped: bool,
        gcs_write_skipped: bool,
    ) -> ChunkMetric {
        let now = self.time_provider.now();
        ChunkMetric {
            offset,
            rows_extracted,
            rows_dropped,
            chunk_duration_seconds: now
                .checked_duration_since(chunk_started)
                .unwrap_or_default()
                .as_secs_f64(),
            delay_applied,
            fetch_skipped,
            gcs_write_skipped,
            timestamp: now.date_time(),
        }
    }

    async fn record_metric(&self, metric: ChunkMetric) {
        // telemetry is never fatal
        if let Err(e) = self.metrics.record(metric).await {
            warn!(error = %e, "failed to record chunk metric");
        }
    }

    async fn post_event(&self, event: PipelineEvent) {
        if let Err(e) = self.events.post(&event).await {
            error!(
                event = %event.event,
                error = %e,
                "failed to post pipeline event; manifest remains the durable signal"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fault::FaultConfig,
        mock::{MockEventSink, MockSourceFeed},
    };
    use data_types::FaultProbability;
    use hyg_time::{MockProvider, Time};
    use object_store::memory::InMemory;
    use rand::{rngs::StdRng, RngCore, SeedableRng};
    use serde_json::{json, Value};
    use stage_store::{read_chunk, read_manifest};
    use std::collections::VecDeque;
    use telemetry::MemoryMetricSink;

    /// An RNG that replays a fixed list of draws, then yields the maximum
    /// (which never fires a gate with probability < 1).
    struct ScriptRng(VecDeque<u64>);

    impl ScriptRng {
        fn new(draws: impl IntoIterator<Item = f64>) -> Self {
            Self(draws.into_iter().map(Self::raw).collect())
        }

        // inverse of rand's 53-bit f64 sampling
        fn raw(value: f64) -> u64 {
            ((value * (1u64 << 53) as f64) as u64) << 11
        }
    }

    impl RngCore for ScriptRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0.pop_front().unwrap_or(u64::MAX)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            rand_core::impls::fill_bytes_via_next(self, dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    struct TestExtractor {
        extractor: Extractor,
        feed: Arc<MockSourceFeed>,
        store: Arc<DynObjectStore>,
        metrics: Arc<MemoryMetricSink>,
        events: Arc<MockEventSink>,
        #[allow(dead_code)]
        time_provider: Arc<MockProvider>,
        shutdown: CancellationToken,
    }

    impl TestExtractor {
        fn new(feed: MockSourceFeed) -> Self {
            test_helpers::maybe_start_logging();

            let feed = Arc::new(feed);
            let store: Arc<DynObjectStore> = Arc::new(InMemory::new());
            let metrics = Arc::new(MemoryMetricSink::new());
            let events = Arc::new(MockEventSink::new());
            let time_provider = Arc::new(MockProvider::new(Time::from_timestamp_nanos(0)));
            let shutdown = CancellationToken::new();

            let extractor = Extractor::new(
                Arc::clone(&feed) as Arc<dyn SourceFeed>,
                Arc::clone(&store),
                Arc::clone(&metrics) as Arc<dyn telemetry::ChunkMetricSink>,
                Arc::clone(&events) as Arc<dyn EventSink>,
                Arc::clone(&time_provider) as Arc<dyn TimeProvider>,
                BackoffConfig {
                    init_backoff: Duration::from_millis(1),
                    max_backoff: Duration::from_millis(5),
                    base: 2.,
                    max_attempts: 3,
                },
                shutdown.clone(),
            );

            Self {
                extractor,
                feed,
                store,
                metrics,
                events,
                time_provider,
                shutdown,
            }
        }

        async fn checkpoint(&self) -> u64 {
            CheckpointStore::new(Arc::clone(&self.store))
                .get()
                .await
                .unwrap()
                .last_offset
        }

        fn event_kinds(&self) -> Vec<EventKind> {
            self.events.events().into_iter().map(|e| e.event).collect()
        }
    }

    fn date() -> ExtractDate {
        ExtractDate::new("2025-03-30").unwrap()
    }

    fn records(start: u64, n: usize) -> Vec<Value> {
        (0..n as u64)
            .map(|i| json!({"inspection_id": start + i, "risk": "Medium"}))
            .collect()
    }

    fn request(max_offset: u64) -> RunRequest {
        RunRequest {
            max_offset,
            ..RunRequest::new(date())
        }
    }

    fn zero_gates() -> FaultGates {
        FaultGates::with_rng(FaultConfig::default(), Box::new(ScriptRng::new(Vec::new())))
    }

    #[tokio::test]
    async fn happy_path_two_chunks() {
        let t = TestExtractor::new(
            MockSourceFeed::new()
                .with_page(0, records(0, 1000))
                .with_page(1000, records(1000, 1000)),
        );

        let outcome = t.extractor.run(request(2000), zero_gates()).await.unwrap();

        assert_eq!(outcome.files, vec!["offset_0.json", "offset_1000.json"]);
        assert_eq!(outcome.rows_extracted, 2000);
        assert_eq!(outcome.rows_dropped, 0);
        assert_eq!(outcome.chunks_attempted, 2);

        // the max_offset bound stops the run before a third fetch
        assert_eq!(t.feed.fetches(), vec![0, 1000]);

        // both blobs are readable and complete
        let chunk = read_chunk(&*t.store, RAW_DATA_PREFIX, &date(), 0).await.unwrap();
        assert_eq!(chunk.len(), 1000);
        let chunk = read_chunk(&*t.store, RAW_DATA_PREFIX, &date(), 1000)
            .await
            .unwrap();
        assert_eq!(chunk.len(), 1000);

        // the manifest lists exactly the produced files
        let manifest = read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .unwrap();
        assert!(manifest.upload_complete);
        assert_eq!(manifest.files, outcome.files);

        // checkpoint advanced once per successful chunk
        assert_eq!(t.checkpoint().await, 2000);

        // two successful metric rows
        let rows = t.metrics.rows();
        assert_eq!(rows.len(), 2);
        for (row, offset) in rows.iter().zip([0u64, 1000]) {
            assert_eq!(row.offset, offset);
            assert_eq!(row.rows_extracted, 1000);
            assert_eq!(row.rows_dropped, 0);
            assert!(!row.fetch_skipped);
            assert!(!row.gcs_write_skipped);
            assert!(!row.delay_applied);
        }

        // lifecycle: started then completed, with a duration on completion
        assert_eq!(
            t.event_kinds(),
            vec![EventKind::ExtractorStarted, EventKind::ExtractorCompleted]
        );
        let completed = &t.events.events()[1];
        assert!(completed.duration.is_some());
    }

    #[tokio::test]
    async fn empty_feed_terminates_normally() {
        let t = TestExtractor::new(MockSourceFeed::new());

        let outcome = t.extractor.run(request(0), zero_gates()).await.unwrap();

        assert!(outcome.files.is_empty());
        assert_eq!(t.feed.fetches(), vec![0]);
        assert_eq!(t.checkpoint().await, 0);

        // an exhausted feed still gets a complete (empty) manifest
        let manifest = read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .unwrap();
        assert!(manifest.upload_complete);
        assert!(manifest.files.is_empty());
    }

    #[tokio::test]
    async fn api_fault_skips_chunk_without_advancing_checkpoint() {
        let t = TestExtractor::new(
            MockSourceFeed::new()
                .with_page(0, records(0, 1000))
                .with_page(1000, records(1000, 1000)),
        );

        // api gate draws per chunk: miss, hit, miss (then feed exhausts)
        let gates = FaultGates::with_rng(
            FaultConfig {
                api_error: FaultProbability::new(0.5),
                ..Default::default()
            },
            Box::new(ScriptRng::new([0.75, 0.25, 0.75])),
        );

        let outcome = t.extractor.run(request(0), gates).await.unwrap();

        assert_eq!(outcome.files, vec!["offset_0.json"]);
        assert_eq!(outcome.chunks_attempted, 3);
        // offset 1000 was never fetched; offset 2000 came back empty
        assert_eq!(t.feed.fetches(), vec![0, 2000]);

        let rows = t.metrics.rows();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].fetch_skipped);
        assert_eq!(rows[1].offset, 1000);
        assert!(rows[1].fetch_skipped);
        assert_eq!(rows[1].rows_extracted, 0);

        // the checkpoint stopped at the last durable chunk
        assert_eq!(t.checkpoint().await, 1000);

        // a follow-up clean run resumes at the skipped offset
        let outcome = t.extractor.run(request(0), zero_gates()).await.unwrap();
        assert_eq!(outcome.files, vec!["offset_1000.json"]);
        assert_eq!(t.checkpoint().await, 2000);
        let chunk = read_chunk(&*t.store, RAW_DATA_PREFIX, &date(), 1000)
            .await
            .unwrap();
        assert_eq!(chunk.len(), 1000);

        // the fresh manifest lists only the fresh run's files
        let manifest = read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(manifest.files, vec!["offset_1000.json"]);
    }

    #[tokio::test]
    async fn store_fault_skips_write_and_checkpoint() {
        let t = TestExtractor::new(MockSourceFeed::new().with_page(0, records(0, 1000)));

        let gates = FaultGates::with_rng(
            FaultConfig {
                gcs_error: FaultProbability::new(0.5),
                ..Default::default()
            },
            // single draw: the store gate for chunk 0 fires
            Box::new(ScriptRng::new([0.25])),
        );

        let outcome = t.extractor.run(request(0), gates).await.unwrap();

        assert!(outcome.files.is_empty());
        assert_eq!(outcome.rows_extracted, 0);

        let rows = t.metrics.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].gcs_write_skipped);
        assert!(!rows[0].fetch_skipped);
        assert_eq!(rows[0].rows_extracted, 0);

        // nothing durable happened, so the next run retries offset 0
        assert_eq!(t.checkpoint().await, 0);
        assert!(read_chunk(&*t.store, RAW_DATA_PREFIX, &date(), 0).await.is_err());
    }

    #[tokio::test]
    async fn row_drop_accounting_adds_up() {
        let t = TestExtractor::new(MockSourceFeed::new().with_page(0, records(0, 1000)));

        let gates = FaultGates::with_rng(
            FaultConfig {
                row_drop: FaultProbability::new(0.15),
                ..Default::default()
            },
            Box::new(StdRng::seed_from_u64(42)),
        );

        let outcome = t.extractor.run(request(0), gates).await.unwrap();

        let rows = t.metrics.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rows_extracted + rows[0].rows_dropped, 1000);
        // ~150 expected; this band is far beyond 3 sigma either way
        assert!(
            (100..=200).contains(&rows[0].rows_dropped),
            "dropped {} rows",
            rows[0].rows_dropped
        );

        // the stored chunk holds exactly the retained rows
        let chunk = read_chunk(&*t.store, RAW_DATA_PREFIX, &date(), 0).await.unwrap();
        assert_eq!(chunk.len() as u64, outcome.rows_extracted);
        assert_eq!(outcome.rows_extracted, rows[0].rows_extracted);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_gate_marks_the_metric() {
        let t = TestExtractor::new(MockSourceFeed::new().with_page(0, records(0, 10)));

        let gates = FaultGates::with_rng(
            FaultConfig {
                delay: FaultProbability::new(1.0),
                ..Default::default()
            },
            Box::new(ScriptRng::new([0.5])),
        );

        let outcome = t.extractor.run(request(0), gates).await.unwrap();
        assert_eq!(outcome.files.len(), 1);

        let rows = t.metrics.rows();
        assert!(rows[0].delay_applied);
        assert!(!rows[0].fetch_skipped);
    }

    #[tokio::test]
    async fn resumes_from_persisted_checkpoint_and_honors_max_offset() {
        let t = TestExtractor::new(
            MockSourceFeed::new()
                .with_page(1000, records(1000, 1000))
                .with_page(2000, records(2000, 1000))
                .with_page(3000, records(3000, 1000)),
        );

        // simulate an earlier run that crashed after landing offset 0
        CheckpointStore::new(Arc::clone(&t.store))
            .put(Checkpoint { last_offset: 1000 })
            .await
            .unwrap();

        let outcome = t.extractor.run(request(2000), zero_gates()).await.unwrap();

        // max_offset bounds rows-this-run relative to the resume point
        assert_eq!(outcome.files, vec!["offset_1000.json", "offset_2000.json"]);
        assert_eq!(t.feed.fetches(), vec![1000, 2000]);
        assert_eq!(t.checkpoint().await, 3000);
        assert_eq!(outcome.rows_extracted, 2000);
    }

    #[tokio::test]
    async fn shutdown_ends_run_before_first_chunk() {
        let t = TestExtractor::new(MockSourceFeed::new().with_page(0, records(0, 1000)));
        t.shutdown.cancel();

        let outcome = t.extractor.run(request(0), zero_gates()).await.unwrap();

        assert!(outcome.files.is_empty());
        assert!(t.feed.fetches().is_empty());
        // a shut-down run still completes: manifest plus completion event
        assert!(read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .is_some());
        assert_eq!(
            t.event_kinds(),
            vec![EventKind::ExtractorStarted, EventKind::ExtractorCompleted]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transient_feed_errors_are_retried() {
        let feed = MockSourceFeed::new().with_page(0, records(0, 5));
        feed.fail_transiently(0, 2);
        let t = TestExtractor::new(feed);

        let outcome = t.extractor.run(request(0), zero_gates()).await.unwrap();

        assert_eq!(outcome.files, vec!["offset_0.json"]);
        // two failures, one success, then the empty page at 1000
        assert_eq!(t.feed.fetches(), vec![0, 0, 0, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_abort_the_run() {
        let feed = MockSourceFeed::new().with_page(0, records(0, 5));
        feed.fail_transiently(0, 10);
        let t = TestExtractor::new(feed);

        let err = t.extractor.run(request(0), zero_gates()).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { offset: 0, .. }));

        // max_attempts in the test config is 3
        assert_eq!(t.feed.fetches(), vec![0, 0, 0]);

        // no manifest, no completion event; started was still posted
        assert!(read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .is_none());
        assert_eq!(t.event_kinds(), vec![EventKind::ExtractorStarted]);
        assert_eq!(t.checkpoint().await, 0);
    }

    #[tokio::test]
    async fn unreachable_orchestrator_does_not_fail_the_run() {
        let t = TestExtractor::new(MockSourceFeed::new().with_page(0, records(0, 10)));
        t.events.set_failing(true);

        let outcome = t.extractor.run(request(0), zero_gates()).await.unwrap();

        assert_eq!(outcome.files.len(), 1);
        assert!(read_manifest(&*t.store, RAW_DATA_PREFIX, &date())
            .await
            .unwrap()
            .is_some());
        assert!(t.events.events().is_empty());
    }

    #[tokio::test]
    async fn checkpoint_is_monotonic_across_runs() {
        let t = TestExtractor::new(
            MockSourceFeed::new()
                .with_page(0, records(0, 1000))
                .with_page(1000, records(1000, 1000)),
        );

        t.extractor.run(request(1000), zero_gates()).await.unwrap();
        let first = t.checkpoint().await;
        assert_eq!(first, 1000);

        t.extractor.run(request(0), zero_gates()).await.unwrap();
        let second = t.checkpoint().await;
        assert!(second >= first);
        assert_eq!(second, 2000);

        // a run against the now-exhausted feed moves nothing
        t.extractor.run(request(0), zero_gates()).await.unwrap();
        assert_eq!(t.checkpoint().await, 2000);
    }
}
