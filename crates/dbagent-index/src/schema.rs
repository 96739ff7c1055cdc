use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

// The index is derived data: binlogs on disk (or offsite) are the source of
// truth, so a version mismatch drops everything and the caller re-adds.

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        if current_version != 0 {
            tracing::warn!(
                from = current_version,
                to = SCHEMA_VERSION,
                "index schema changed, dropping indexed binlogs"
            );
        }
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS query (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            binlog TEXT NOT NULL,
            db_name TEXT,
            table_name TEXT,
            timestamp INTEGER NOT NULL,
            type TEXT NOT NULL,
            query TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_query_binlog ON query(binlog);
        CREATE INDEX IF NOT EXISTS idx_query_ts ON query(timestamp);
        CREATE INDEX IF NOT EXISTS idx_query_db_ts ON query(db_name, timestamp);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS query;
        "#,
    )?;
    Ok(())
}
