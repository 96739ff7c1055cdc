use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A binary log file found in the MariaDB data directory.
///
/// Names are zero-padded by MariaDB (`mysql-bin.000123`), so lexicographic
/// order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinlogFile {
    pub name: String,
    /// Size on disk in bytes
    pub size: u64,
    pub modified_at: DateTime<Utc>,
}

/// Point-in-time view of the three binlog sources.
///
/// Each field is read independently; they can disagree for a short while
/// (a file indexed and since purged, a rotation between reads).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinlogSnapshot {
    pub binlogs_in_disk: Vec<BinlogFile>,
    pub indexed_binlogs: Vec<String>,
    pub current_binlog: Option<String>,
}

/// A statement found by a binlog search, stamped with the most recent
/// `SET TIMESTAMP` marker that preceded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub query: String,
    /// UTC, second precision: `2024-01-01 00:00:00`
    pub timestamp: String,
}

/// Statement kind stored in the query index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Insert,
    Update,
    Delete,
    Select,
    Other,
}

impl QueryType {
    pub const ALL: [QueryType; 5] = [
        QueryType::Insert,
        QueryType::Update,
        QueryType::Delete,
        QueryType::Select,
        QueryType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Insert => "insert",
            QueryType::Update => "update",
            QueryType::Delete => "delete",
            QueryType::Select => "select",
            QueryType::Other => "other",
        }
    }

    /// Parse a stored or user-supplied type name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "insert" => Some(QueryType::Insert),
            "update" => Some(QueryType::Update),
            "delete" => Some(QueryType::Delete),
            "select" => Some(QueryType::Select),
            "other" => Some(QueryType::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_parse_is_case_insensitive() {
        assert_eq!(QueryType::parse("UPDATE"), Some(QueryType::Update));
        assert_eq!(QueryType::parse("Delete"), Some(QueryType::Delete));
        assert_eq!(QueryType::parse("truncate"), None);
    }
}
