use crate::{DatabaseServer, Error, Result};
use dbagent_types::{
    IndexReport, IndexedQuery, QueryType, RowIdGroups, Timeline, UnindexReport,
};
use std::time::Duration;

impl DatabaseServer {
    /// Index `binlogs` in order, stopping at the first failure.
    ///
    /// Nothing is indexed while the host is busier than the configured
    /// threshold; the report then carries only a message.
    pub fn add_binlogs_to_index(&self, binlogs: &[String]) -> IndexReport {
        let mut report = IndexReport {
            current_binlog: self.current_binlog(),
            ..Default::default()
        };

        if let Some(message) = self.cpu_gate("Skipped indexing") {
            report.message = message;
            return report;
        }

        for binlog in binlogs {
            match self.binlog_path(binlog).and_then(|path| self.indexer.add(&path)) {
                Ok(()) => report.indexed_binlogs.push(binlog.clone()),
                Err(err) => {
                    tracing::warn!(binlog = %binlog, error = %err, "indexing stopped");
                    report.message = format!("Failed to index binlog {}: {}", binlog, err);
                    break;
                }
            }
        }

        report
    }

    /// Remove `binlogs` from the index in order, stopping at the first failure.
    pub fn remove_binlogs_from_index(&self, binlogs: &[String]) -> UnindexReport {
        let mut report = UnindexReport {
            current_binlog: self.current_binlog(),
            ..Default::default()
        };

        if let Some(message) = self.cpu_gate("Not safe to unindex binlogs") {
            report.message = message;
            return report;
        }

        for binlog in binlogs {
            match self.binlog_path(binlog).and_then(|path| self.indexer.remove(&path)) {
                Ok(()) => report.unindexed_binlogs.push(binlog.clone()),
                Err(err) => {
                    tracing::warn!(binlog = %binlog, error = %err, "unindexing stopped");
                    report.message = format!("Failed to unindex binlog {}: {}", binlog, err);
                    break;
                }
            }
        }

        report
    }

    pub fn get_timeline(
        &self,
        start: i64,
        end: i64,
        database: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Timeline> {
        let kind = kind.map(parse_query_type).transpose()?;
        self.indexer.timeline(start, end, database, kind)
    }

    pub fn get_row_ids(
        &self,
        start: i64,
        end: i64,
        kind: &str,
        database: &str,
        table: Option<&str>,
        search: Option<&str>,
    ) -> Result<RowIdGroups> {
        let kind = parse_query_type(kind)?;
        self.indexer
            .row_ids(start, end, kind, database, table, search)
    }

    pub fn get_queries(&self, row_ids: &RowIdGroups, database: &str) -> Result<Vec<IndexedQuery>> {
        self.indexer.queries(row_ids, database)
    }

    /// `Some(message)` when indexing must yield to the database.
    ///
    /// Blocks for the sample window.
    fn cpu_gate(&self, action: &str) -> Option<String> {
        let threshold = self.config.index_cpu_threshold;
        let window = Duration::from_secs(self.config.cpu_sample_secs);

        match self.cpu.cpu_percent(window) {
            Ok(usage) if usage > threshold => {
                tracing::info!(usage, threshold, "host busy, index change skipped");
                Some(format!("CPU usage > {}%. {}", threshold, action))
            }
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(error = %err, "CPU sample failed, index change skipped");
                Some(format!("CPU usage unknown ({}). {}", err, action))
            }
        }
    }
}

fn parse_query_type(value: &str) -> Result<QueryType> {
    QueryType::parse(value)
        .ok_or_else(|| Error::InvalidInput(format!("unknown query type: {:?}", value)))
}
