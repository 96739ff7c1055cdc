use crate::QueryType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of an add-to-index batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub indexed_binlogs: Vec<String>,
    /// Empty on full success; otherwise why the batch stopped or was skipped
    pub message: String,
    pub current_binlog: Option<String>,
}

/// Result of a remove-from-index batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnindexReport {
    pub unindexed_binlogs: Vec<String>,
    pub message: String,
    pub current_binlog: Option<String>,
}

/// Index row ids grouped by the binlog they came from
pub type RowIdGroups = BTreeMap<String, Vec<i64>>;

/// Query counts over a time range, bucketed by `interval` seconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub interval: i64,
    pub databases: Vec<String>,
    pub tables: Vec<String>,
    pub results: Vec<TimelineBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Bucket start (unix seconds)
    pub timestamp: i64,
    pub insert: u64,
    pub update: u64,
    pub delete: u64,
    pub select: u64,
    pub other: u64,
}

impl TimelineBucket {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    pub fn add(&mut self, kind: QueryType, count: u64) {
        match kind {
            QueryType::Insert => self.insert += count,
            QueryType::Update => self.update += count,
            QueryType::Delete => self.delete += count,
            QueryType::Select => self.select += count,
            QueryType::Other => self.other += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.insert + self.update + self.delete + self.select + self.other
    }
}

/// A statement stored in the query index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedQuery {
    pub id: i64,
    pub binlog: String,
    pub database: Option<String>,
    pub table: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: QueryType,
    pub query: String,
}
