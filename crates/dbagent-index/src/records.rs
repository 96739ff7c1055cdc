use dbagent_types::QueryType;

/// Statement to be written into the index under a binlog name.
///
/// Read-side rows come back as [`dbagent_types::IndexedQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    /// Database in effect when the statement ran, if known.
    pub database: Option<String>,
    /// Target table for DML statements.
    pub table: Option<String>,
    /// Unix seconds from the preceding `SET TIMESTAMP` marker.
    pub timestamp: i64,
    pub kind: QueryType,
    pub query: String,
}
