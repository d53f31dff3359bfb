use crate::poller::LogRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Indexed form of a service log. The record id becomes the document `_id`
/// and is not part of the body.
#[derive(Debug, Clone, Serialize)]
pub struct ElasticSearchDocument<'a> {
    #[serde(skip)]
    pub id: &'a str,
    pub cluster_id: &'a str,
    pub username: &'a str,
    pub severity: &'a str,
    pub event_stream_id: &'a str,
    pub created_by: &'a str,
    pub message: &'a str,
    #[serde(rename = "@timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl<'a> From<&'a LogRecord> for ElasticSearchDocument<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            id: &record.id,
            cluster_id: &record.cluster_id,
            username: &record.username,
            severity: &record.severity,
            event_stream_id: &record.event_stream_id,
            created_by: &record.created_by,
            message: &record.summary,
            timestamp: record.timestamp,
        }
    }
}
