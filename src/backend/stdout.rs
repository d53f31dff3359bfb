use super::{Backend, BackendContext, BackendError, SendReport, SentSet};
use crate::poller::{AggregateResponse, LogRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

pub const NAME: &str = "stdout";

/// Writes each service log as one JSON line. A record counts as delivered
/// as soon as its line is written.
pub struct StdoutBackend {
    writer: Box<dyn Write + Send>,
}

#[derive(Serialize)]
struct ConsoleLine<'a> {
    source: &'static str,
    #[serde(rename = "_id")]
    id: &'a str,
    #[serde(rename = "@timestamp", skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    cluster_id: &'a str,
    external_id: &'a str,
    username: &'a str,
    severity: &'a str,
    event_id: &'a str,
    service_name: &'a str,
    message: &'a str,
}

impl<'a> From<&'a LogRecord> for ConsoleLine<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            source: "stdout-backend",
            id: &record.id,
            timestamp: record.timestamp,
            cluster_id: &record.cluster_id,
            external_id: &record.cluster_uuid,
            username: &record.username,
            severity: &record.severity,
            event_id: &record.event_stream_id,
            service_name: &record.service_name,
            message: &record.summary,
        }
    }
}

impl StdoutBackend {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl Default for StdoutBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for StdoutBackend {
    async fn initialize(&mut self, _ctx: &BackendContext) -> Result<(), BackendError> {
        Ok(())
    }

    async fn send(
        &mut self,
        response: &AggregateResponse,
        sent: &mut SentSet,
    ) -> Result<SendReport, BackendError> {
        let unsent = sent.unsent_records(&response.records);
        let mut report = SendReport {
            attempted: unsent.len(),
            ..SendReport::default()
        };

        for record in unsent {
            let line = serde_json::to_string(&ConsoleLine::from(record))?;
            writeln!(self.writer, "{}", line)?;
            sent.mark_sent(record.id.as_str());
            report.sent += 1;
        }
        self.writer.flush()?;

        Ok(report)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
