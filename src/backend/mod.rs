//! Delivery of service logs to a storage backend.
//!
//! Exactly one backend is active per process. It is chosen from config by
//! [`from_config`], initialized once at startup, and then handed each poll
//! cycle's [`AggregateResponse`] together with the controller's [`SentSet`].

pub mod dedup;
pub mod elasticsearch;
pub mod stdout;

pub use dedup::{make_batches, Batch, SentSet, DEFAULT_BATCH_SIZE};
pub use elasticsearch::ElasticSearchBackend;
pub use stdout::StdoutBackend;

use crate::config::{BackendType, Config};
use crate::poller::AggregateResponse;
use crate::secrets::{SecretError, SecretStore};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend auth type [{0}] is unknown")]
    UnknownAuthType(String),

    #[error("invalid auth secret: {0}")]
    AuthSecret(String),

    #[error("secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("unable to configure TLS: {0}")]
    Tls(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend [{0}] used before initialize")]
    NotInitialized(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a backend needs from the rest of the process to initialize.
pub struct BackendContext {
    pub config: Config,
    pub secrets: Arc<dyn SecretStore>,
}

impl BackendContext {
    pub fn new(config: Config, secrets: Arc<dyn SecretStore>) -> Self {
        Self { config, secrets }
    }

    pub fn cluster_id(&self) -> &str {
        &self.config.cluster_id
    }
}

/// Outcome of one [`Backend::send`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    /// Unsent records found in the response
    pub attempted: usize,
    /// Records confirmed delivered and added to the sent set
    pub sent: usize,
    /// Records the backend rejected individually
    pub failed: usize,
    /// Batches dropped because the request itself failed
    pub skipped_batches: usize,
}

impl SendReport {
    /// Records that remain eligible for the next poll cycle
    pub fn outstanding(&self) -> usize {
        self.attempted.saturating_sub(self.sent)
    }
}

#[async_trait]
pub trait Backend: Send {
    /// Set up clients and credentials. A failure here prevents startup.
    async fn initialize(&mut self, ctx: &BackendContext) -> Result<(), BackendError>;

    /// Deliver every record of `response` whose id is not in `sent`.
    ///
    /// Ids are added to `sent` only once the backend confirms them. Per-item
    /// and per-batch failures are logged and reported, not returned as errors.
    async fn send(
        &mut self,
        response: &AggregateResponse,
        sent: &mut SentSet,
    ) -> Result<SendReport, BackendError>;

    fn name(&self) -> &'static str;
}

/// Build the backend selected by `config.backend.type`.
pub fn from_config(config: &Config) -> Box<dyn Backend> {
    match config.backend.backend_type {
        BackendType::Elasticsearch => Box::new(ElasticSearchBackend::new(
            config.backend.elasticsearch.clone(),
            config.cluster_id.clone(),
        )),
        BackendType::Stdout => Box::new(StdoutBackend::new()),
    }
}
