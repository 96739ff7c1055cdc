use rusqlite::Connection;
use std::path::Path;

use crate::queries::{query, timeline};
use crate::records::QueryRecord;
use crate::{Error, Result, schema};
use dbagent_types::{IndexedQuery, QueryType, RowIdGroups, Timeline};

// The index is a lookup aid over binlogs, never the source of truth:
// re-adding a binlog replaces its rows wholesale, and a schema bump
// drops everything so binlogs get re-added from disk.

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the index file, creating its parent directory.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(db_path)?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.conn)
    }

    // Write operations

    /// Replace every row of `binlog` with `records` in one transaction.
    ///
    /// Returns the number of rows written.
    pub fn replace_binlog(&self, binlog: &str, records: &[QueryRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        query::delete_binlog(&tx, binlog)?;
        for record in records {
            query::insert(&tx, binlog, record)?;
        }
        tx.commit()?;

        tracing::debug!(binlog, rows = records.len(), "replaced binlog rows in index");
        Ok(records.len())
    }

    /// Delete every row of `binlog`. Returns the number of rows removed.
    pub fn remove_binlog(&self, binlog: &str) -> Result<usize> {
        let removed = query::delete_binlog(&self.conn, binlog)?;
        tracing::debug!(binlog, rows = removed, "removed binlog rows from index");
        Ok(removed)
    }

    // Read operations

    pub fn indexed_binlogs(&self) -> Result<Vec<String>> {
        query::indexed_binlogs(&self.conn)
    }

    pub fn timeline(
        &self,
        start: i64,
        end: i64,
        database: Option<&str>,
        kind: Option<QueryType>,
    ) -> Result<Timeline> {
        timeline::timeline(&self.conn, start, end, database, kind)
    }

    pub fn row_ids(
        &self,
        start: i64,
        end: i64,
        kind: QueryType,
        database: &str,
        table: Option<&str>,
        search: Option<&str>,
    ) -> Result<RowIdGroups> {
        query::row_ids(&self.conn, start, end, kind, database, table, search)
    }

    pub fn queries(&self, row_ids: &RowIdGroups, database: &str) -> Result<Vec<IndexedQuery>> {
        query::queries(&self.conn, row_ids, database)
    }

    pub fn count(&self) -> Result<usize> {
        query::count(&self.conn)
    }
}
