use crate::poller::response::{page_count, AggregateResponse, Page};
use crate::poller::token::Token;
use thiserror::Error;
use tracing::{debug, warn};

pub const SERVICE_LOG_PATH: &str = "/api/service_logs/v1/cluster_logs";

#[derive(Debug, Error)]
pub enum RetrieveError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service log API returned error status {status} for page {page}: {message}")]
    Status {
        status: u16,
        page: usize,
        message: String,
    },

    #[error("unable to decode service log page {page}: {source}")]
    Decode {
        page: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("token has no API endpoint; refresh it before polling")]
    InvalidToken,
}

pub type Result<T> = std::result::Result<T, RetrieveError>;

/// HTTP client for the OCM service log listing
#[derive(Debug, Clone)]
pub struct ServiceLogClient {
    client: reqwest::Client,
    page_size: usize,
}

impl ServiceLogClient {
    pub fn new(client: reqwest::Client, page_size: usize) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    /// Fetches every page of service logs for `cluster_id`.
    ///
    /// Pages are requested in order starting at 1 until the page count implied
    /// by the first page's `total`/`size` is reached. A page with no items ends
    /// the walk early, so an overstated `total` cannot keep it going. Any failed
    /// page discards everything fetched so far.
    pub async fn request(&self, token: &Token, cluster_id: &str) -> Result<AggregateResponse> {
        if token.endpoint().is_empty() {
            return Err(RetrieveError::InvalidToken);
        }

        let url = format!("{}{}", token.endpoint(), SERVICE_LOG_PATH);
        let search = format!("cluster_id = '{}'", cluster_id);

        let mut aggregate: Option<AggregateResponse> = None;
        let mut page_number = 1;

        loop {
            let page = self.get_page(&url, token, &search, page_number).await?;
            let item_count = page.items.len();

            let response = aggregate.get_or_insert_with(|| {
                let size = if page.size == 0 { self.page_size } else { page.size };
                AggregateResponse::new(size, page.total)
            });
            response.append(page);

            let pages = page_count(response.total, response.size);
            debug!(
                cluster = %cluster_id,
                page = page_number,
                page_count = pages,
                items = item_count,
                "Retrieved service log page"
            );

            if page_number >= pages {
                break;
            }

            if item_count == 0 {
                warn!(
                    cluster = %cluster_id,
                    page = page_number,
                    page_count = pages,
                    total = response.total,
                    received = response.len(),
                    "Empty page before computed last page, stopping pagination"
                );
                break;
            }

            page_number += 1;
        }

        Ok(aggregate.unwrap_or_default())
    }

    async fn get_page(
        &self,
        url: &str,
        token: &Token,
        search: &str,
        page_number: usize,
    ) -> Result<Page> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token.bearer_token())
            .query(&[
                ("search", search.to_string()),
                ("size", self.page_size.to_string()),
                ("page", page_number.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RetrieveError::Status {
                status: response.status().as_u16(),
                page: page_number,
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| RetrieveError::Decode {
            page: page_number,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_for(server: &MockServer) -> Token {
        Token::with_values(
            "bearer-1",
            Some(Utc::now() + Duration::minutes(10)),
            &server.uri(),
        )
    }

    fn page_body(page: usize, size: usize, total: usize, ids: &[&str]) -> serde_json::Value {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| serde_json::json!({"id": id, "cluster_id": "abc123", "summary": format!("log {}", id)}))
            .collect();
        serde_json::json!({
            "kind": "ClusterLogList",
            "page": page,
            "size": size,
            "total": total,
            "items": items,
        })
    }

    #[tokio::test]
    async fn test_single_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SERVICE_LOG_PATH))
            .and(header("authorization", "Bearer bearer-1"))
            .and(query_param("search", "cluster_id = 'abc123'"))
            .and(query_param("size", "1000"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1000, 2, &["a", "b"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ServiceLogClient::new(reqwest::Client::new(), 1000);
        let response = client.request(&token_for(&server), "abc123").await.unwrap();

        assert_eq!(response.len(), 2);
        assert_eq!(response.page_count(), 1);
        assert_eq!(response.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_multiple_pages_preserve_order() {
        let server = MockServer::start().await;
        for (page, ids) in [(1, vec!["a", "b"]), (2, vec!["c", "d"]), (3, vec!["e"])] {
            Mock::given(method("GET"))
                .and(path(SERVICE_LOG_PATH))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(page_body(page, 2, 5, &ids)))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = ServiceLogClient::new(reqwest::Client::new(), 2);
        let response = client.request(&token_for(&server), "abc123").await.unwrap();

        let ids: Vec<&str> = response.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(response.total, 5);
        assert_eq!(response.page_count(), 3);
        assert_eq!(response.pages_fetched, 3);
    }

    #[tokio::test]
    async fn test_empty_result_fetches_one_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1000, 0, &[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ServiceLogClient::new(reqwest::Client::new(), 1000);
        let response = client.request(&token_for(&server), "abc123").await.unwrap();

        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_overstated_total_stops_on_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 2, 100, &["a", "b"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(2, 2, 100, &[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ServiceLogClient::new(reqwest::Client::new(), 2);
        let response = client.request(&token_for(&server), "abc123").await.unwrap();

        assert_eq!(response.len(), 2);
        assert_eq!(response.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_failed_page_aborts_retrieval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 2, 4, &["a", "b"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = ServiceLogClient::new(reqwest::Client::new(), 2);
        let err = client.request(&token_for(&server), "abc123").await.unwrap_err();

        match err {
            RetrieveError::Status { status, page, .. } => {
                assert_eq!(status, 503);
                assert_eq!(page, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = ServiceLogClient::new(reqwest::Client::new(), 1000);
        let err = client.request(&token_for(&server), "abc123").await.unwrap_err();

        assert!(matches!(err, RetrieveError::Decode { page: 1, .. }));
    }

    #[tokio::test]
    async fn test_token_without_endpoint() {
        let client = ServiceLogClient::new(reqwest::Client::new(), 1000);
        let err = client.request(&Token::new(), "abc123").await.unwrap_err();
        assert!(matches!(err, RetrieveError::InvalidToken));
    }
}
