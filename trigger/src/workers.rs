//! Addressing and invoking the stage workers.

use async_trait::async_trait;
use data_types::{ExtractDate, RunRequest, Stage};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use std::{collections::HashMap, fmt::Debug, time::Duration};

/// Errors parsing the service configuration blob.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum ServiceMapError {
    #[snafu(display("cannot decode service config blob: {}", source))]
    Decode { source: base64::DecodeError },

    #[snafu(display("cannot parse service config JSON: {}", source))]
    Parse { source: serde_json::Error },
}

/// Errors invoking a worker.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum WorkerError {
    #[snafu(display("no endpoint configured for stage {}", stage))]
    UnknownStage { stage: Stage },

    #[snafu(display("cannot build worker client: {}", source))]
    Client { source: reqwest::Error },

    #[snafu(display("error calling {} worker: {}", stage, source))]
    Request {
        stage: Stage,
        source: reqwest::Error,
    },

    #[snafu(display("{} worker returned status {}", stage, status))]
    Status {
        stage: Stage,
        status: reqwest::StatusCode,
    },
}

/// One worker endpoint from the service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerEndpoint {
    /// Full URL of the worker's ingress.
    pub url: String,
}

/// The stage → endpoint map injected at startup.
///
/// The wire form is `SERVICE_CONFIG_B64`: base64 over a JSON object such as
/// `{"cleaner": {"url": "http://cleaner.internal/clean"}}`. All coupling
/// between components is by URL configuration; nothing holds a reference to
/// another component.
#[derive(Debug, Clone, Default)]
pub struct ServiceMap(HashMap<String, WorkerEndpoint>);

impl ServiceMap {
    /// An empty map (useful for tests).
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the base64 JSON blob.
    pub fn from_base64(blob: &str) -> Result<Self, ServiceMapError> {
        let raw = base64::decode(blob.trim()).context(DecodeSnafu)?;
        let map = serde_json::from_slice(&raw).context(ParseSnafu)?;
        Ok(Self(map))
    }

    /// Register `stage` at `url`.
    pub fn insert(&mut self, stage: Stage, url: impl Into<String>) {
        self.0
            .insert(stage.as_str().to_string(), WorkerEndpoint { url: url.into() });
    }

    /// The endpoint for `stage`, if configured.
    pub fn url_for(&self, stage: Stage) -> Option<&str> {
        self.0.get(stage.as_str()).map(|e| e.url.as_str())
    }
}

/// Invokes stage workers on behalf of the router.
#[async_trait]
pub trait WorkerClient: Debug + Send + Sync {
    /// Forward a run request, verbatim, to the extractor.
    async fn start_run(&self, request: &RunRequest) -> Result<(), WorkerError>;

    /// Kick `stage` for `date`.
    async fn notify(&self, stage: Stage, date: &ExtractDate) -> Result<(), WorkerError>;
}

#[derive(Serialize)]
struct StageKickoff<'a> {
    date: &'a ExtractDate,
}

/// [`WorkerClient`] over plain HTTP POSTs.
#[derive(Debug)]
pub struct HttpWorkerClient {
    client: reqwest::Client,
    services: ServiceMap,
}

impl HttpWorkerClient {
    /// Create a client over `services` with a per-request `timeout`.
    pub fn new(services: ServiceMap, timeout: Duration) -> Result<Self, WorkerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(ClientSnafu)?;
        Ok(Self { client, services })
    }

    async fn post<T: Serialize + Sync>(&self, stage: Stage, body: &T) -> Result<(), WorkerError> {
        let url = self
            .services
            .url_for(stage)
            .context(UnknownStageSnafu { stage })?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context(RequestSnafu { stage })?;

        let status = response.status();
        ensure!(status.is_success(), StatusSnafu { stage, status });
        Ok(())
    }
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn start_run(&self, request: &RunRequest) -> Result<(), WorkerError> {
        self.post(Stage::Extractor, request).await
    }

    async fn notify(&self, stage: Stage, date: &ExtractDate) -> Result<(), WorkerError> {
        self.post(stage, &StageKickoff { date }).await
    }
}
