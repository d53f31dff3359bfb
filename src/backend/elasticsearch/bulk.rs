use super::auth::BasicCredentials;
use super::document::ElasticSearchDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("error sending bulk request to elasticsearch: {0}")]
    Http(#[from] reqwest::Error),

    #[error("elasticsearch bulk request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unable to decode bulk response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct IndexAction<'a> {
    index: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
}

/// NDJSON body of one `_bulk` call: an `index` action line followed by the
/// document line, per document.
#[derive(Debug)]
pub struct BulkRequest {
    index: String,
    body: String,
    ids: Vec<String>,
}

impl BulkRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            body: String::new(),
            ids: Vec::new(),
        }
    }

    pub fn add(&mut self, document: &ElasticSearchDocument<'_>) -> Result<(), serde_json::Error> {
        let action = serde_json::to_string(&IndexAction {
            index: ActionMeta {
                index: &self.index,
                id: document.id,
            },
        })?;
        let source = serde_json::to_string(document)?;

        self.body.push_str(&action);
        self.body.push('\n');
        self.body.push_str(&source);
        self.body.push('\n');
        self.ids.push(document.id.to_string());

        Ok(())
    }

    pub fn number_of_actions(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub async fn send(
        self,
        client: &reqwest::Client,
        url: &str,
        credentials: &BasicCredentials,
        cluster_id: &str,
    ) -> Result<BulkResponse, BulkError> {
        info!(
            cluster = %cluster_id,
            index = %self.index,
            document_count = self.number_of_actions(),
            "Sending documents to elasticsearch"
        );

        let response = client
            .post(url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(self.body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BulkError::Status {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
    /// One map per action, keyed by the action name (`index`, `create`, ...)
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkItem {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    pub status: u16,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

impl BulkItem {
    pub fn succeeded(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl BulkResponse {
    fn all_items(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().flat_map(|item| item.values())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &BulkItem> {
        self.all_items().filter(|item| item.succeeded())
    }

    pub fn failed(&self) -> impl Iterator<Item = &BulkItem> {
        self.all_items().filter(|item| !item.succeeded())
    }

    pub fn created(&self) -> impl Iterator<Item = &BulkItem> {
        self.succeeded()
            .filter(|item| item.result.as_deref() == Some("created"))
    }

    pub fn updated(&self) -> impl Iterator<Item = &BulkItem> {
        self.succeeded()
            .filter(|item| item.result.as_deref() == Some("updated"))
    }
}
