// Binlog lifecycle and incident diagnostics for one MariaDB host.
//
// `DatabaseServer` is the only entry point. Every operation is synchronous
// and self-contained: connections and temporary files live for one call.

pub mod column_stats;
pub mod config;
pub mod error;
pub mod indexer;
pub mod jobs;
pub mod ops;
pub mod rows;
pub mod server;
pub mod storage;

pub use column_stats::{ColumnStatsCollector, MariadbColumnStats};
pub use config::{AgentConfig, resolve_agent_dir};
pub use error::{Error, Result};
pub use indexer::{BinlogIndexer, Indexer};
pub use jobs::{JobPriority, JobSpec, StepRecorder, TracingRecorder};
pub use server::{Collaborators, DatabaseServer};
pub use storage::{OffsiteStorage, OffsiteStorageFactory, S3StorageFactory};
