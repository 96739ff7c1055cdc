use crate::rows::{row_i64, row_str};
use crate::{DatabaseServer, Result};
use dbagent_core::SqlParam;
use dbagent_types::{ColumnStatistics, DbTarget, Row};

// Live-diagnostic calls degrade to "no data": the plain variants log and
// return an empty result, the `try_` variants surface the cause.

const LOCKS_QUERY: &str = "SELECT l.*, t.* \
     FROM information_schema.INNODB_LOCKS l \
     JOIN information_schema.INNODB_TRX t ON l.lock_trx_id = t.trx_id";

const DEADLOCKS_QUERY: &str = "SELECT * FROM deadlock \
     WHERE user = ? AND ts >= ? AND ts <= ? \
     ORDER BY ts LIMIT ?";

/// Sessions that belong to replication and must never be killed
const PROTECTED_USER: &str = "system user";
const PROTECTED_COMMANDS: [&str; 3] = ["Binlog Dump", "Slave_SQL", "Slave_IO"];

const EXPLAINABLE: [&str; 3] = ["select", "update", "delete"];

fn or_empty<T: Default>(operation: &str, result: Result<T>) -> T {
    result.unwrap_or_else(|err| {
        tracing::error!(operation, error = %err, "diagnostic query failed");
        T::default()
    })
}

impl DatabaseServer {
    pub fn processes(&self, target: &DbTarget) -> Vec<Row> {
        or_empty("processes", self.try_processes(target))
    }

    pub fn try_processes(&self, target: &DbTarget) -> Result<Vec<Row>> {
        let mut conn = self.sql.connect(target, "mysql")?;
        Ok(conn.query("SHOW FULL PROCESSLIST")?)
    }

    pub fn variables(&self, target: &DbTarget) -> Vec<Row> {
        or_empty("variables", self.try_variables(target))
    }

    pub fn try_variables(&self, target: &DbTarget) -> Result<Vec<Row>> {
        let mut conn = self.sql.connect(target, "mysql")?;
        Ok(conn.query("SHOW VARIABLES")?)
    }

    /// Lock waits joined with the transactions holding or requesting them
    pub fn locks(&self, target: &DbTarget) -> Vec<Row> {
        or_empty("locks", self.try_locks(target))
    }

    pub fn try_locks(&self, target: &DbTarget) -> Result<Vec<Row>> {
        let mut conn = self.sql.connect(target, "mysql")?;
        Ok(conn.query(LOCKS_QUERY)?)
    }

    /// Kill user sessions running for at least `threshold` seconds.
    ///
    /// Returns the ids killed. Any failure yields an empty list, even when
    /// some sessions were already killed; use
    /// [`DatabaseServer::try_kill_processes`] to see the cause.
    pub fn kill_processes(&self, target: &DbTarget, threshold: i64) -> Vec<i64> {
        or_empty("kill_processes", self.try_kill_processes(target, threshold))
    }

    /// Like [`DatabaseServer::kill_processes`], but the first failed `KILL`
    /// aborts the rest and is returned.
    pub fn try_kill_processes(&self, target: &DbTarget, threshold: i64) -> Result<Vec<i64>> {
        let victims: Vec<i64> = self
            .try_processes(target)?
            .iter()
            .filter(|process| is_killable(process, threshold))
            .filter_map(|process| row_i64(process, "Id"))
            .collect();

        if victims.is_empty() {
            return Ok(victims);
        }

        let mut conn = self.sql.connect(target, "mysql")?;
        for id in &victims {
            conn.execute(&format!("KILL {}", id))?;
            tracing::info!(id, threshold, "killed long-running session");
        }
        Ok(victims)
    }

    /// Deadlocks recorded by pt-deadlock-logger for `database`'s user,
    /// oldest first.
    pub fn deadlocks(
        &self,
        target: &DbTarget,
        database: &str,
        start: &str,
        stop: &str,
        max_lines: u32,
    ) -> Vec<Row> {
        or_empty(
            "deadlocks",
            self.try_deadlocks(target, database, start, stop, max_lines),
        )
    }

    pub fn try_deadlocks(
        &self,
        target: &DbTarget,
        database: &str,
        start: &str,
        stop: &str,
        max_lines: u32,
    ) -> Result<Vec<Row>> {
        let mut conn = self.sql.connect(target, "percona")?;
        let params = [
            SqlParam::from(database),
            SqlParam::from(start),
            SqlParam::from(stop),
            SqlParam::from(i64::from(max_lines)),
        ];
        Ok(conn.query_with(DEADLOCKS_QUERY, &params)?)
    }

    /// `EXPLAIN` rows for a select/update/delete statement.
    ///
    /// Other statements get `Some(vec![])`; a statement the server rejects
    /// gets `None`.
    pub fn explain_query(&self, target: &DbTarget, database: &str, query: &str) -> Option<Vec<Row>> {
        match self.try_explain_query(target, database, query) {
            Ok(rows) => Some(rows),
            Err(err) => {
                tracing::error!(database, error = %err, "explain failed");
                None
            }
        }
    }

    pub fn try_explain_query(&self, target: &DbTarget, database: &str, query: &str) -> Result<Vec<Row>> {
        if !is_explainable(query) {
            return Ok(Vec::new());
        }
        let mut conn = self.sql.connect(target, database)?;
        Ok(conn.query(&format!("EXPLAIN {}", query))?)
    }

    pub fn column_statistics(
        &self,
        target: &DbTarget,
        schema: &str,
        table: &str,
    ) -> Result<ColumnStatistics> {
        self.column_stats.collect(target, schema, table)
    }
}

fn is_killable(process: &Row, threshold: i64) -> bool {
    let time = row_i64(process, "Time").unwrap_or(0);
    let user = row_str(process, "User").unwrap_or_default();
    let command = row_str(process, "Command").unwrap_or_default();

    time >= threshold && user != PROTECTED_USER && !PROTECTED_COMMANDS.contains(&command)
}

fn is_explainable(query: &str) -> bool {
    let head = query.to_ascii_lowercase();
    EXPLAINABLE.iter().any(|keyword| head.starts_with(keyword))
}
