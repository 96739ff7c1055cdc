use crate::{Error, Result};
use dbagent_core::{CommandSpec, ShellExecutor};
use dbagent_engine::parse_statements;
use dbagent_index::{Database, QueryRecord};
use dbagent_types::{IndexedQuery, QueryType, RowIdGroups, Timeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persisted, queryable mapping from binlog content to statement metadata.
///
/// Binlogs are identified by path on `add`/`remove` and by file name
/// everywhere else.
pub trait Indexer: Send + Sync {
    fn add(&self, binlog: &Path) -> Result<()>;

    fn remove(&self, binlog: &Path) -> Result<()>;

    fn indexed_binlogs(&self) -> Result<Vec<String>>;

    fn timeline(
        &self,
        start: i64,
        end: i64,
        database: Option<&str>,
        kind: Option<QueryType>,
    ) -> Result<Timeline>;

    fn row_ids(
        &self,
        start: i64,
        end: i64,
        kind: QueryType,
        database: &str,
        table: Option<&str>,
        search: Option<&str>,
    ) -> Result<RowIdGroups>;

    fn queries(&self, row_ids: &RowIdGroups, database: &str) -> Result<Vec<IndexedQuery>>;
}

/// SQLite-backed indexer fed by the extraction tool.
///
/// The index file is opened per call; nothing is held between operations.
pub struct BinlogIndexer {
    shell: Arc<dyn ShellExecutor>,
    tool: String,
    db_path: PathBuf,
}

impl BinlogIndexer {
    pub fn new(shell: Arc<dyn ShellExecutor>, tool: impl Into<String>, db_path: PathBuf) -> Self {
        Self {
            shell,
            tool: tool.into(),
            db_path,
        }
    }

    fn open(&self) -> Result<Database> {
        Ok(Database::open(&self.db_path)?)
    }
}

fn binlog_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("not a binlog path: {}", path.display())))
}

impl Indexer for BinlogIndexer {
    fn add(&self, binlog: &Path) -> Result<()> {
        let name = binlog_name(binlog)?;
        let command = CommandSpec::new(&self.tool)
            .arg("--short-form")
            .arg(binlog.to_string_lossy());
        let output = self.shell.run(&command)?;

        let records: Vec<QueryRecord> = parse_statements(&output.stdout)?
            .into_iter()
            .map(|statement| QueryRecord {
                database: statement.database,
                table: statement.table,
                timestamp: statement.timestamp,
                kind: statement.kind,
                query: statement.query,
            })
            .collect();

        let written = self.open()?.replace_binlog(name, &records)?;
        tracing::info!(binlog = name, statements = written, "indexed binlog");
        Ok(())
    }

    fn remove(&self, binlog: &Path) -> Result<()> {
        let name = binlog_name(binlog)?;
        let removed = self.open()?.remove_binlog(name)?;
        tracing::info!(binlog = name, statements = removed, "unindexed binlog");
        Ok(())
    }

    fn indexed_binlogs(&self) -> Result<Vec<String>> {
        Ok(self.open()?.indexed_binlogs()?)
    }

    fn timeline(
        &self,
        start: i64,
        end: i64,
        database: Option<&str>,
        kind: Option<QueryType>,
    ) -> Result<Timeline> {
        Ok(self.open()?.timeline(start, end, database, kind)?)
    }

    fn row_ids(
        &self,
        start: i64,
        end: i64,
        kind: QueryType,
        database: &str,
        table: Option<&str>,
        search: Option<&str>,
    ) -> Result<RowIdGroups> {
        Ok(self
            .open()?
            .row_ids(start, end, kind, database, table, search)?)
    }

    fn queries(&self, row_ids: &RowIdGroups, database: &str) -> Result<Vec<IndexedQuery>> {
        Ok(self.open()?.queries(row_ids, database)?)
    }
}
