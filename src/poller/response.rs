use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One service log entry as returned by the OCM service log API.
///
/// Identity is `id` alone; everything else is payload carried to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_uuid: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub event_stream_id: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A single page of the `cluster_logs` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub items: Vec<LogRecord>,
}

/// Every record from every page of one poll cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateResponse {
    pub records: Vec<LogRecord>,
    pub size: usize,
    pub total: usize,
    #[serde(skip)]
    pub pages_fetched: usize,
}

impl AggregateResponse {
    pub fn new(size: usize, total: usize) -> Self {
        Self {
            records: Vec::new(),
            size,
            total,
            pages_fetched: 0,
        }
    }

    pub fn from_records(records: Vec<LogRecord>) -> Self {
        let total = records.len();
        Self {
            records,
            size: total.max(1),
            total,
            pages_fetched: 1,
        }
    }

    /// Number of pages implied by `total` and `size`; a partial final page counts.
    pub fn page_count(&self) -> usize {
        page_count(self.total, self.size)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, page: Page) {
        self.records.extend(page.items);
        self.pages_fetched += 1;
    }
}

pub fn page_count(total: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size)
}
