use crate::column_stats::{ColumnStatsCollector, MariadbColumnStats};
use crate::config::AgentConfig;
use crate::indexer::{BinlogIndexer, Indexer};
use crate::storage::{OffsiteStorageFactory, S3StorageFactory};
use crate::{Error, Result};
use dbagent_core::{
    CpuSampler, MariadbConnector, ProcStatSampler, ShellExecutor, SqlConnector, SystemShell,
    is_binlog_name,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything `DatabaseServer` reaches outside the process through
#[derive(Clone)]
pub struct Collaborators {
    pub shell: Arc<dyn ShellExecutor>,
    pub sql: Arc<dyn SqlConnector>,
    pub cpu: Arc<dyn CpuSampler>,
    pub indexer: Arc<dyn Indexer>,
    pub storage: Arc<dyn OffsiteStorageFactory>,
    pub column_stats: Arc<dyn ColumnStatsCollector>,
}

impl Collaborators {
    /// Live host: real processes, MariaDB over TCP, `/proc/stat`, S3.
    pub fn system(config: &AgentConfig) -> Self {
        let shell: Arc<dyn ShellExecutor> = Arc::new(SystemShell);
        let sql: Arc<dyn SqlConnector> = Arc::new(MariadbConnector);

        Self {
            indexer: Arc::new(BinlogIndexer::new(
                shell.clone(),
                config.binlog_tool.clone(),
                config.index_path(),
            )),
            column_stats: Arc::new(MariadbColumnStats::new(sql.clone())),
            cpu: Arc::new(ProcStatSampler::default()),
            storage: Arc::new(S3StorageFactory),
            shell,
            sql,
        }
    }
}

/// The MariaDB host as seen by the control plane
pub struct DatabaseServer {
    pub(crate) config: AgentConfig,
    pub(crate) shell: Arc<dyn ShellExecutor>,
    pub(crate) sql: Arc<dyn SqlConnector>,
    pub(crate) cpu: Arc<dyn CpuSampler>,
    pub(crate) indexer: Arc<dyn Indexer>,
    pub(crate) storage: Arc<dyn OffsiteStorageFactory>,
    pub(crate) column_stats: Arc<dyn ColumnStatsCollector>,
}

impl DatabaseServer {
    pub fn new(config: AgentConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            shell,
            sql,
            cpu,
            indexer,
            storage,
            column_stats,
        } = collaborators;

        Self {
            config,
            shell,
            sql,
            cpu,
            indexer,
            storage,
            column_stats,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Path of a caller-named binlog inside the data directory
    pub(crate) fn binlog_path(&self, name: &str) -> Result<PathBuf> {
        if !is_binlog_name(name) {
            return Err(Error::InvalidInput(format!("not a binlog name: {:?}", name)));
        }
        Ok(self.config.binlog_path(name))
    }
}
