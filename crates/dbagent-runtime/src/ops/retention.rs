use crate::{DatabaseServer, Error, Result};
use dbagent_core::is_binlog_name;
use dbagent_types::DbTarget;

impl DatabaseServer {
    /// Purge every binlog before `to_binlog`. Any failure yields `false`.
    pub fn purge_binlog(&self, target: &DbTarget, to_binlog: &str) -> bool {
        match self.try_purge_binlog(target, to_binlog) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(to_binlog, error = %err, "binlog purge failed");
                false
            }
        }
    }

    pub fn try_purge_binlog(&self, target: &DbTarget, to_binlog: &str) -> Result<()> {
        // Interpolated into the statement below
        if !is_binlog_name(to_binlog) {
            return Err(Error::InvalidInput(format!("not a binlog name: {:?}", to_binlog)));
        }

        let mut conn = self.sql.connect(target, "mysql")?;
        conn.execute(&format!("PURGE BINARY LOGS TO '{}'", to_binlog))?;
        tracing::info!(to_binlog, "purged binlogs");
        Ok(())
    }
}
