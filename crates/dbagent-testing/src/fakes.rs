//! In-memory collaborators.
//!
//! Each fake records what it was asked to do so tests can assert on side
//! effects, and accepts scripted responses and injected failures.

use dbagent_core::{
    CommandOutput, CommandSpec, CpuSampler, ShellExecutor, SqlConnection, SqlConnector, SqlParam,
};
use dbagent_runtime::{
    AgentConfig, Collaborators, DatabaseServer, Indexer, MariadbColumnStats, OffsiteStorage,
    OffsiteStorageFactory,
};
use dbagent_types::{DbTarget, IndexedQuery, OffsiteConfig, QueryType, Row, RowIdGroups, Timeline};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn fake_io(kind: ErrorKind, msg: impl Into<String>) -> dbagent_core::Error {
    dbagent_core::Error::Io(std::io::Error::new(kind, msg.into()))
}

// ---------------------------------------------------------------------------
// Shell

/// Scripted `ShellExecutor`; responds by matching an argument substring
#[derive(Default)]
pub struct FakeShell {
    default_stdout: Mutex<String>,
    responses: Mutex<Vec<(String, String)>>,
    failures: Mutex<Vec<String>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout for commands no response matches
    pub fn set_stdout(&self, stdout: impl Into<String>) {
        *self.default_stdout.lock().unwrap() = stdout.into();
    }

    /// Stdout for commands with an argument containing `needle`
    pub fn respond(&self, needle: impl Into<String>, stdout: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push((needle.into(), stdout.into()));
    }

    /// Fail commands with an argument containing `needle`
    pub fn fail_on(&self, needle: impl Into<String>) {
        self.failures.lock().unwrap().push(needle.into());
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

impl ShellExecutor for FakeShell {
    fn run(&self, command: &CommandSpec) -> dbagent_core::Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        let mentions = |needle: &str| command.args.iter().any(|arg| arg.contains(needle));

        if let Some(needle) = self.failures.lock().unwrap().iter().find(|n| mentions(n)) {
            return Err(dbagent_core::Error::Command {
                program: command.program.clone(),
                code: Some(1),
                stderr: format!("scripted failure for {}", needle),
            });
        }

        let stdout = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| mentions(needle))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_else(|| self.default_stdout.lock().unwrap().clone());

        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// SQL

/// A statement as the fake server received it
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub database: String,
    pub sql: String,
    pub params: Vec<SqlParam>,
}

#[derive(Default)]
struct SqlState {
    responses: Vec<(String, Vec<Row>)>,
    failures: Vec<String>,
    refuse_connections: bool,
    connections: Vec<String>,
    statements: Vec<Statement>,
}

/// Scripted `SqlConnector`; every connection shares one recorded history
#[derive(Default, Clone)]
pub struct FakeSqlConnector {
    state: Arc<Mutex<SqlState>>,
}

impl FakeSqlConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows returned for statements containing `needle`
    pub fn respond(&self, needle: impl Into<String>, rows: Vec<Row>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push((needle.into(), rows));
    }

    /// Fail statements containing `needle`
    pub fn fail_on(&self, needle: impl Into<String>) {
        self.state.lock().unwrap().failures.push(needle.into());
    }

    pub fn refuse_connections(&self) {
        self.state.lock().unwrap().refuse_connections = true;
    }

    /// Database name of every connection opened, in order
    pub fn connections(&self) -> Vec<String> {
        self.state.lock().unwrap().connections.clone()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state.lock().unwrap().statements.clone()
    }

    /// SQL text of every statement received, in order
    pub fn sql_log(&self) -> Vec<String> {
        self.statements().into_iter().map(|s| s.sql).collect()
    }
}

impl SqlConnector for FakeSqlConnector {
    fn connect(
        &self,
        target: &DbTarget,
        database: &str,
    ) -> dbagent_core::Result<Box<dyn SqlConnection>> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_connections {
            return Err(fake_io(
                ErrorKind::ConnectionRefused,
                format!("connection to {}:{} refused", target.host, target.port),
            ));
        }
        state.connections.push(database.to_string());

        Ok(Box::new(FakeConnection {
            state: self.state.clone(),
            database: database.to_string(),
        }))
    }
}

struct FakeConnection {
    state: Arc<Mutex<SqlState>>,
    database: String,
}

impl FakeConnection {
    fn run(&mut self, sql: &str, params: &[SqlParam]) -> dbagent_core::Result<Vec<Row>> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(Statement {
            database: self.database.clone(),
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        if state.failures.iter().any(|needle| sql.contains(needle.as_str())) {
            return Err(fake_io(ErrorKind::Other, format!("scripted failure: {}", sql)));
        }

        Ok(state
            .responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

impl SqlConnection for FakeConnection {
    fn query(&mut self, sql: &str) -> dbagent_core::Result<Vec<Row>> {
        self.run(sql, &[])
    }

    fn query_with(&mut self, sql: &str, params: &[SqlParam]) -> dbagent_core::Result<Vec<Row>> {
        self.run(sql, params)
    }

    fn execute(&mut self, sql: &str) -> dbagent_core::Result<()> {
        self.run(sql, &[]).map(|_| ())
    }
}

/// Build a row from a JSON object literal
pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("row fixture must be a JSON object, got {}", other),
    }
}

// ---------------------------------------------------------------------------
// CPU

/// Reports a fixed utilisation without sleeping
pub struct FixedCpu {
    percent: Mutex<Option<f32>>,
    samples: Mutex<Vec<Duration>>,
}

impl FixedCpu {
    pub fn new(percent: f32) -> Self {
        Self {
            percent: Mutex::new(Some(percent)),
            samples: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, percent: f32) {
        *self.percent.lock().unwrap() = Some(percent);
    }

    /// Make every sample fail
    pub fn break_sampling(&self) {
        *self.percent.lock().unwrap() = None;
    }

    /// Requested sample windows, in order
    pub fn samples(&self) -> Vec<Duration> {
        self.samples.lock().unwrap().clone()
    }
}

impl CpuSampler for FixedCpu {
    fn cpu_percent(&self, window: Duration) -> dbagent_core::Result<f32> {
        self.samples.lock().unwrap().push(window);
        self.percent
            .lock()
            .unwrap()
            .ok_or_else(|| dbagent_core::Error::Cpu("scripted sampling failure".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Indexer

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    Add(String),
    Remove(String),
}

#[derive(Default)]
struct IndexState {
    indexed: Vec<String>,
    calls: Vec<IndexCall>,
    failures: Vec<String>,
}

/// `Indexer` that tracks names only; lookups return empty results
#[derive(Default)]
pub struct RecordingIndexer {
    state: Mutex<IndexState>,
}

impl RecordingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indexed(names: &[&str]) -> Self {
        let indexer = Self::new();
        indexer.state.lock().unwrap().indexed = names.iter().map(|n| n.to_string()).collect();
        indexer
    }

    /// Fail add/remove for the binlog `name`
    pub fn fail_on(&self, name: impl Into<String>) {
        self.state.lock().unwrap().failures.push(name.into());
    }

    /// Every add/remove attempted, including failed ones
    pub fn calls(&self) -> Vec<IndexCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn mutate(&self, call: IndexCall) -> dbagent_runtime::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());

        let (IndexCall::Add(name) | IndexCall::Remove(name)) = &call;
        if state.failures.contains(name) {
            return Err(dbagent_core::Error::Command {
                program: "mariadb-binlog".to_string(),
                code: Some(1),
                stderr: format!("Could not open log file '{}'", name),
            }
            .into());
        }

        match call {
            IndexCall::Add(name) => {
                if !state.indexed.contains(&name) {
                    state.indexed.push(name);
                }
            }
            IndexCall::Remove(name) => state.indexed.retain(|n| *n != name),
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Indexer for RecordingIndexer {
    fn add(&self, binlog: &Path) -> dbagent_runtime::Result<()> {
        self.mutate(IndexCall::Add(file_name(binlog)))
    }

    fn remove(&self, binlog: &Path) -> dbagent_runtime::Result<()> {
        self.mutate(IndexCall::Remove(file_name(binlog)))
    }

    fn indexed_binlogs(&self) -> dbagent_runtime::Result<Vec<String>> {
        let mut names = self.state.lock().unwrap().indexed.clone();
        names.sort();
        Ok(names)
    }

    fn timeline(
        &self,
        start: i64,
        end: i64,
        _database: Option<&str>,
        _kind: Option<QueryType>,
    ) -> dbagent_runtime::Result<Timeline> {
        Ok(Timeline {
            start_timestamp: start,
            end_timestamp: end,
            interval: ((end - start) / 60).max(1),
            ..Default::default()
        })
    }

    fn row_ids(
        &self,
        _start: i64,
        _end: i64,
        _kind: QueryType,
        _database: &str,
        _table: Option<&str>,
        _search: Option<&str>,
    ) -> dbagent_runtime::Result<RowIdGroups> {
        Ok(RowIdGroups::new())
    }

    fn queries(
        &self,
        _row_ids: &RowIdGroups,
        _database: &str,
    ) -> dbagent_runtime::Result<Vec<IndexedQuery>> {
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Offsite storage

#[derive(Default)]
struct StorageState {
    objects: BTreeMap<String, Vec<u8>>,
    sources: Vec<PathBuf>,
    failures: Vec<String>,
    refuse: bool,
}

/// Bucket kept in memory; uploads read the compressed file immediately
#[derive(Default, Clone)]
pub struct MemoryStorage {
    state: Arc<Mutex<StorageState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads whose key contains `needle`
    pub fn fail_on(&self, needle: impl Into<String>) {
        self.state.lock().unwrap().failures.push(needle.into());
    }

    /// Make building the client fail, as with bad credentials
    pub fn refuse_connections(&self) {
        self.state.lock().unwrap().refuse = true;
    }

    pub fn objects(&self) -> BTreeMap<String, Vec<u8>> {
        self.state.lock().unwrap().objects.clone()
    }

    /// Local files handed to `upload`, in order
    pub fn sources(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().sources.clone()
    }
}

impl OffsiteStorageFactory for MemoryStorage {
    fn connect(&self, config: &OffsiteConfig) -> dbagent_runtime::Result<Box<dyn OffsiteStorage>> {
        if self.state.lock().unwrap().refuse {
            return Err(dbagent_runtime::Error::Storage(format!(
                "failed to build S3 client for bucket {}",
                config.bucket
            )));
        }
        Ok(Box::new(self.clone()))
    }
}

impl OffsiteStorage for MemoryStorage {
    fn upload(&self, source: &Path, key: &str) -> dbagent_runtime::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sources.push(source.to_path_buf());

        if state.failures.iter().any(|needle| key.contains(needle.as_str())) {
            return Err(dbagent_runtime::Error::Storage(format!(
                "upload of {} rejected",
                key
            )));
        }

        let bytes = std::fs::read(source)?;
        state.objects.insert(key.to_string(), bytes);
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// One fake of each collaborator, kept around for assertions
pub struct FakeHost {
    pub shell: Arc<FakeShell>,
    pub sql: FakeSqlConnector,
    pub cpu: Arc<FixedCpu>,
    pub indexer: Arc<RecordingIndexer>,
    pub storage: MemoryStorage,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// An idle host with nothing indexed
    pub fn new() -> Self {
        Self::with_indexer(RecordingIndexer::new())
    }

    pub fn with_indexer(indexer: RecordingIndexer) -> Self {
        Self {
            shell: Arc::new(FakeShell::new()),
            sql: FakeSqlConnector::new(),
            cpu: Arc::new(FixedCpu::new(10.0)),
            indexer: Arc::new(indexer),
            storage: MemoryStorage::new(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        let sql: Arc<dyn SqlConnector> = Arc::new(self.sql.clone());
        Collaborators {
            shell: self.shell.clone(),
            column_stats: Arc::new(MariadbColumnStats::new(sql.clone())),
            sql,
            cpu: self.cpu.clone(),
            indexer: self.indexer.clone(),
            storage: Arc::new(self.storage.clone()),
        }
    }

    pub fn server(&self, config: AgentConfig) -> DatabaseServer {
        DatabaseServer::new(config, self.collaborators())
    }
}
