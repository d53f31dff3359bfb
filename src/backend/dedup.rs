use crate::poller::LogRecord;
use std::collections::HashSet;

/// Default number of records per bulk delivery
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Ids of records confirmed delivered during this process's lifetime.
///
/// Only grows. Nothing is persisted, so a restart forwards everything again.
#[derive(Debug, Clone, Default)]
pub struct SentSet {
    ids: HashSet<String>,
}

impl SentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns true if the id was not already present.
    pub fn mark_sent(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Records not yet sent, in their original order. An id repeated within
    /// `records` is only returned at its first position.
    pub fn unsent_records<'a>(&self, records: &'a [LogRecord]) -> Vec<&'a LogRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        records
            .iter()
            .filter(|record| !self.contains(&record.id))
            .filter(|record| seen.insert(record.id.as_str()))
            .collect()
    }
}

/// Contiguous group of records delivered in a single backend call.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    pub number: usize,
    pub records: &'a [&'a LogRecord],
}

impl<'a> Batch<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.records.iter().map(|record| record.id.as_str())
    }
}

/// Splits `records` into order-preserving batches of at most `batch_size`.
/// A `batch_size` of zero is treated as one.
pub fn make_batches<'a>(records: &'a [&'a LogRecord], batch_size: usize) -> Vec<Batch<'a>> {
    records
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(number, records)| Batch { number, records })
        .collect()
}
