use crate::backend::{self, BackendContext, BackendError};
use crate::config::Config;
use crate::controller::{Controller, ControllerError};
use crate::poller::Poller;
use crate::secrets::{FileSecretStore, SecretStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("backend initialization failed: {0}")]
    Backend(#[from] BackendError),

    #[error("unable to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}

/// Wires the secret store, backend, poller and controller together and runs
/// until a cycle fails.
pub async fn run(config: Config) -> Result<(), RunError> {
    info!(
        cluster = %config.cluster_id,
        backend = %config.backend.backend_type,
        interval_minutes = config.poller.interval_minutes,
        "Loaded configuration"
    );

    info!(path = %config.secret_store.path.display(), "Using secret store");
    let secrets: Arc<dyn SecretStore> =
        Arc::new(FileSecretStore::new(config.secret_store.path.clone()));

    let mut backend = backend::from_config(&config);
    let ctx = BackendContext::new(config.clone(), secrets.clone());
    backend.initialize(&ctx).await?;

    let http = reqwest::Client::builder().use_rustls_tls().build()?;
    let poller = Poller::new(
        config.cluster_id.clone(),
        config.secret.clone(),
        secrets,
        http,
        config.poller.page_size,
    );

    let mut controller = Controller::new(poller, backend, config.poller.interval());
    controller.run().await?;

    Ok(())
}
