//! Shared types for the ingestion pipeline: run requests, pipeline events,
//! stage manifests, checkpoints and per-chunk telemetry rows.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::{ensure, OptionExt, Snafu};
use std::str::FromStr;

/// Errors constructing validated domain types.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum Error {
    #[snafu(display("'{}' is not a valid YYYY-MM-DD extraction date", value))]
    InvalidDate { value: String },
}

/// A validated `YYYY-MM-DD` calendar day identifying one pipeline run.
///
/// The date doubles as the partition key for every object-store prefix, so
/// only the canonical zero-padded rendering is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtractDate(String);

impl ExtractDate {
    /// Validate and construct a date.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let parsed = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .ok()
            .context(InvalidDateSnafu { value: &value })?;

        // reject non-canonical renderings such as `2025-3-30`
        let canonical = parsed.format("%Y-%m-%d").to_string();
        ensure!(canonical == value, InvalidDateSnafu { value });

        Ok(Self(value))
    }

    /// The canonical `YYYY-MM-DD` rendering.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExtractDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExtractDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ExtractDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ExtractDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// A fault-injection probability, clamped to `[0, 1]`.
///
/// The wire representation is a JSON number; strings are rejected so that
/// type confusion cannot silently disable (or saturate) a gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct FaultProbability(f64);

impl FaultProbability {
    /// Construct, clamping out-of-range values at the bounds. NaN reads as 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The clamped probability.
    pub fn get(&self) -> f64 {
        self.0
    }

    /// True if this gate can never fire.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Serialize for FaultProbability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for FaultProbability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::new)
    }
}

/// A request to run the pipeline for one date.
///
/// Forwarded verbatim from the trigger to the extractor, fault-injection
/// probabilities included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// The calendar day to extract.
    pub date: ExtractDate,

    /// Upper bound on rows fetched this run, relative to the checkpoint the
    /// run starts from. Zero means unbounded.
    #[serde(default)]
    pub max_offset: u64,

    /// Probability of simulating an upstream API failure per chunk.
    #[serde(default)]
    pub api_error_prob: FaultProbability,

    /// Probability of simulating an object-store write failure per chunk.
    #[serde(default)]
    pub gcs_error_prob: FaultProbability,

    /// Probability of dropping each individual record.
    #[serde(default)]
    pub row_drop_prob: FaultProbability,

    /// Probability of injecting a fixed delay before the chunk write.
    #[serde(default)]
    pub delay_prob: FaultProbability,
}

impl RunRequest {
    /// A request for `date` with no bound and no injected faults.
    pub fn new(date: ExtractDate) -> Self {
        Self {
            date,
            max_offset: 0,
            api_error_prob: Default::default(),
            gcs_error_prob: Default::default(),
            row_drop_prob: Default::default(),
            delay_prob: Default::default(),
        }
    }
}

/// The kind of a [`PipelineEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The extractor began a run.
    ExtractorStarted,
    /// The extractor finished a run and wrote its manifest.
    ExtractorCompleted,
    /// The cleaning worker finished a date.
    CleanerCompleted,
    /// The row-oriented loader finished a date.
    LoaderJsonCompleted,
    /// The columnar loader finished a date; terminal for the pipeline.
    LoaderParquetCompleted,
    /// Any event string this version does not recognize.
    Unknown,
}

impl EventKind {
    /// The wire name of this event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractorStarted => "extractor_started",
            Self::ExtractorCompleted => "extractor_completed",
            Self::CleanerCompleted => "cleaner_completed",
            Self::LoaderJsonCompleted => "loader_json_completed",
            Self::LoaderParquetCompleted => "loader_parquet_completed",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire name; anything unrecognized maps to [`Self::Unknown`] so
    /// the orchestrator can log-and-drop rather than reject the request.
    pub fn from_name(name: &str) -> Self {
        match name {
            "extractor_started" => Self::ExtractorStarted,
            "extractor_completed" => Self::ExtractorCompleted,
            "cleaner_completed" => Self::CleanerCompleted,
            "loader_json_completed" => Self::LoaderJsonCompleted,
            "loader_parquet_completed" => Self::LoaderParquetCompleted,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// A pipeline stage addressable by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The chunked extractor.
    Extractor,
    /// The cleaning transform.
    Cleaner,
    /// The row-oriented (NDJSON) loader.
    LoaderJson,
    /// The columnar (Parquet) loader.
    LoaderParquet,
}

impl Stage {
    /// The stage's key in the service configuration map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extractor => "extractor",
            Self::Cleaner => "cleaner",
            Self::LoaderJson => "loader_json",
            Self::LoaderParquet => "loader_parquet",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The completion/lifecycle message every stage posts to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// What happened.
    pub event: EventKind,

    /// Which worker reports it, e.g. `extractor`.
    pub origin: String,

    /// The date the report is about.
    pub date: ExtractDate,

    /// When the reporting worker emitted the event.
    pub timestamp: DateTime<Utc>,

    /// Stage duration in seconds, if the stage measured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl PipelineEvent {
    /// Build an event without a duration.
    pub fn new(
        event: EventKind,
        origin: impl Into<String>,
        date: ExtractDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event,
            origin: origin.into(),
            date,
            timestamp,
            duration: None,
        }
    }

    /// Attach a measured duration in seconds.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

/// The extractor's durable resume point.
///
/// Deliberately not scoped by date: `last_offset` only moves forward, and only
/// after a chunk has durably landed in the object store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The next offset a run should fetch from.
    pub last_offset: u64,
}

/// The per-(stage, date) completion marker written to object storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageManifest {
    /// The date the stage processed.
    pub date: ExtractDate,

    /// Every file the stage produced for the date, in production order.
    pub files: Vec<String>,

    /// True once the stage has landed all files. Downstream refuses to run
    /// on anything else.
    pub upload_complete: bool,
}

/// One telemetry row per attempted chunk, including fault-skipped attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetric {
    /// Starting offset of the chunk.
    pub offset: u64,

    /// Rows retained and written for this chunk.
    pub rows_extracted: u64,

    /// Rows discarded by the row-drop gate.
    pub rows_dropped: u64,

    /// Wall-clock seconds spent on the chunk.
    pub chunk_duration_seconds: f64,

    /// True if the delay gate fired.
    pub delay_applied: bool,

    /// True if the simulated-API-failure gate skipped the fetch.
    pub fetch_skipped: bool,

    /// True if the simulated-store-failure gate skipped the write.
    pub gcs_write_skipped: bool,

    /// When the chunk attempt finished.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_date_accepts_canonical() {
        let d = ExtractDate::new("2025-03-30").unwrap();
        assert_eq!(d.as_str(), "2025-03-30");
        assert_eq!(d.to_string(), "2025-03-30");
    }

    #[test]
    fn extract_date_rejects_garbage() {
        assert!(ExtractDate::new("yesterday").is_err());
        assert!(ExtractDate::new("2025-13-01").is_err());
        assert!(ExtractDate::new("2025-02-30").is_err());
        // non-canonical rendering would split the object-store prefix space
        assert!(ExtractDate::new("2025-3-30").is_err());
        assert!(ExtractDate::new("2025-03-30T00:00:00").is_err());
    }

    #[test]
    fn fault_probability_clamps() {
        assert_eq!(FaultProbability::new(0.25).get(), 0.25);
        assert_eq!(FaultProbability::new(1.5).get(), 1.0);
        assert_eq!(FaultProbability::new(-0.2).get(), 0.0);
        assert_eq!(FaultProbability::new(f64::NAN).get(), 0.0);
        assert!(FaultProbability::default().is_zero());
    }

    #[test]
    fn run_request_defaults() {
        let req: RunRequest = serde_json::from_str(r#"{"date": "2025-03-30"}"#).unwrap();
        assert_eq!(req.date.as_str(), "2025-03-30");
        assert_eq!(req.max_offset, 0);
        assert!(req.api_error_prob.is_zero());
        assert!(req.delay_prob.is_zero());
    }

    #[test]
    fn run_request_probabilities_are_numbers() {
        // a stringly-typed probability is a hard error, not a coercion
        let res: Result<RunRequest, _> =
            serde_json::from_str(r#"{"date": "2025-03-30", "api_error_prob": "0.5"}"#);
        assert!(res.is_err());

        let req: RunRequest = serde_json::from_str(
            r#"{"date": "2025-03-30", "max_offset": 2000, "api_error_prob": 7.0}"#,
        )
        .unwrap();
        assert_eq!(req.max_offset, 2000);
        assert_eq!(req.api_error_prob.get(), 1.0);
    }

    #[test]
    fn event_kind_wire_names_round_trip() {
        let kinds = [
            EventKind::ExtractorStarted,
            EventKind::ExtractorCompleted,
            EventKind::CleanerCompleted,
            EventKind::LoaderJsonCompleted,
            EventKind::LoaderParquetCompleted,
        ];
        for kind in kinds {
            assert_eq!(EventKind::from_name(kind.as_str()), kind);
        }
        assert_eq!(EventKind::from_name("backfill_completed"), EventKind::Unknown);
    }

    #[test]
    fn pipeline_event_serde() {
        let event = PipelineEvent::new(
            EventKind::ExtractorCompleted,
            "extractor",
            ExtractDate::new("2025-03-30").unwrap(),
            Utc::now(),
        )
        .with_duration(12.5);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "extractor_completed");
        assert_eq!(json["origin"], "extractor");
        assert_eq!(json["duration"], 12.5);

        let back: PipelineEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn pipeline_event_omits_missing_duration() {
        let event = PipelineEvent::new(
            EventKind::ExtractorStarted,
            "extractor",
            ExtractDate::new("2025-03-30").unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("duration").is_none());
    }

    #[test]
    fn unknown_event_kind_is_preserved_not_rejected() {
        let event: PipelineEvent = serde_json::from_str(
            r#"{"event": "mystery", "origin": "op", "date": "2025-03-30",
                "timestamp": "2025-03-30T01:02:03Z"}"#,
        )
        .unwrap();
        assert_eq!(event.event, EventKind::Unknown);
    }

    #[test]
    fn checkpoint_serde() {
        let cp = Checkpoint { last_offset: 3000 };
        let json = serde_json::to_string(&cp).unwrap();
        assert_eq!(json, r#"{"last_offset":3000}"#);
        assert_eq!(serde_json::from_str::<Checkpoint>(&json).unwrap(), cp);
        assert_eq!(Checkpoint::default().last_offset, 0);
    }
}
