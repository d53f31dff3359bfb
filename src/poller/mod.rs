pub mod client;
pub mod response;
pub mod token;

pub use client::{RetrieveError, ServiceLogClient};
pub use response::{AggregateResponse, LogRecord, Page};
pub use token::{Token, TokenData, TokenError};

use crate::config::SecretRef;
use crate::secrets::SecretStore;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("unable to refresh token: {0}")]
    Token(#[from] TokenError),

    #[error("unable to retrieve service logs: {0}")]
    Retrieve(#[from] RetrieveError),
}

/// Retrieves the service logs of one cluster, refreshing the bearer token
/// whenever it is no longer valid.
pub struct Poller {
    cluster_id: String,
    secret: SecretRef,
    secrets: Arc<dyn SecretStore>,
    http: reqwest::Client,
    client: ServiceLogClient,
    token: Token,
}

impl Poller {
    pub fn new(
        cluster_id: impl Into<String>,
        secret: SecretRef,
        secrets: Arc<dyn SecretStore>,
        http: reqwest::Client,
        page_size: usize,
    ) -> Self {
        let client = ServiceLogClient::new(http.clone(), page_size);
        Self {
            cluster_id: cluster_id.into(),
            secret,
            secrets,
            http,
            client,
            token: Token::new(),
        }
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub async fn poll(&mut self) -> Result<AggregateResponse, PollError> {
        if !self.token.is_valid() {
            info!(cluster = %self.cluster_id, "Refreshing token");
            self.token
                .refresh(
                    self.secrets.as_ref(),
                    &self.secret,
                    &self.cluster_id,
                    &self.http,
                )
                .await?;
        }

        info!(cluster = %self.cluster_id, "Retrieving service logs");
        let response = self.client.request(&self.token, &self.cluster_id).await?;
        info!(
            cluster = %self.cluster_id,
            records = response.len(),
            pages = response.pages_fetched,
            "Retrieved service logs"
        );

        Ok(response)
    }
}
