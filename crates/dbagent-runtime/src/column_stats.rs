use crate::Result;
use dbagent_core::{SqlConnector, SqlParam, quote_identifier};
use dbagent_types::{ColumnStatistics, DbTarget};
use std::sync::Arc;

/// Computes per-column statistics the optimizer uses for one table
pub trait ColumnStatsCollector: Send + Sync {
    fn collect(&self, target: &DbTarget, schema: &str, table: &str) -> Result<ColumnStatistics>;
}

/// Engine-independent statistics from `mysql.column_stats`
pub struct MariadbColumnStats {
    sql: Arc<dyn SqlConnector>,
}

impl MariadbColumnStats {
    pub fn new(sql: Arc<dyn SqlConnector>) -> Self {
        Self { sql }
    }
}

impl ColumnStatsCollector for MariadbColumnStats {
    fn collect(&self, target: &DbTarget, schema: &str, table: &str) -> Result<ColumnStatistics> {
        let mut conn = self.sql.connect(target, schema)?;

        // Refresh before reading; stale stats are what the caller is chasing
        conn.execute(&format!(
            "ANALYZE TABLE {}.{} PERSISTENT FOR ALL",
            quote_identifier(schema),
            quote_identifier(table)
        ))?;

        let rows = conn.query_with(
            "SELECT * FROM mysql.column_stats WHERE db_name = ? AND table_name = ?",
            &[SqlParam::from(schema), SqlParam::from(table)],
        )?;

        Ok(ColumnStatistics {
            output: serde_json::to_string(&rows)?,
        })
    }
}
