use crate::types::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbagent")]
#[command(about = "Binlog lifecycle and incident diagnostics for a MariaDB host", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file; defaults to `config.toml` in the agent directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// Administrative connection to the live server
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    #[arg(long, default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "DBAGENT_MARIADB_ROOT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
pub enum Commands {
    Binlogs {
        #[command(subcommand)]
        command: BinlogsCommand,
    },

    /// Search one binlog for statements matching a pattern
    Search {
        binlog: String,

        #[arg(long)]
        database: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        stop: String,

        #[arg(long)]
        pattern: String,

        #[arg(long, default_value = "1000")]
        max_lines: usize,
    },

    Index {
        #[command(subcommand)]
        command: IndexCommand,
    },

    /// Compress binlogs and upload them to offsite storage
    Archive {
        #[arg(required = true)]
        binlogs: Vec<String>,

        /// JSON file with `bucket`, `path` and `auth`
        #[arg(long)]
        offsite: PathBuf,
    },

    /// Purge binlogs older than the named one
    Purge {
        to_binlog: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    Processes {
        #[command(flatten)]
        target: TargetArgs,
    },

    Variables {
        #[command(flatten)]
        target: TargetArgs,
    },

    Locks {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Kill user sessions running for at least `threshold` seconds
    Kill {
        #[arg(long)]
        threshold: i64,

        #[command(flatten)]
        target: TargetArgs,
    },

    Deadlocks {
        #[arg(long)]
        database: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        stop: String,

        #[arg(long, default_value = "1000")]
        max_lines: u32,

        #[command(flatten)]
        target: TargetArgs,
    },

    Explain {
        #[arg(long)]
        database: String,

        query: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    ColumnStats {
        #[arg(long)]
        schema: String,

        #[arg(long)]
        table: String,

        /// Control-plane document the result is reported against
        #[arg(long)]
        doc_name: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    Stalks {
        #[command(subcommand)]
        command: StalksCommand,
    },
}

#[derive(Subcommand)]
pub enum BinlogsCommand {
    /// Binlog files in the data directory
    List,

    /// Binlog the server is writing to
    Current,

    /// Disk, index and current binlog together
    Snapshot,
}

#[derive(Subcommand)]
pub enum IndexCommand {
    Add {
        #[arg(required = true)]
        binlogs: Vec<String>,
    },

    Remove {
        #[arg(required = true)]
        binlogs: Vec<String>,
    },

    Timeline {
        #[arg(long)]
        start: i64,

        #[arg(long)]
        end: i64,

        #[arg(long)]
        database: Option<String>,

        #[arg(long = "type")]
        kind: Option<String>,
    },

    RowIds {
        #[arg(long)]
        start: i64,

        #[arg(long)]
        end: i64,

        #[arg(long = "type")]
        kind: String,

        #[arg(long)]
        database: String,

        #[arg(long)]
        table: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    Queries {
        #[arg(long)]
        database: String,

        /// Output of `index row-ids`: `{"<binlog>": [id, ...]}`
        #[arg(long)]
        row_ids: String,
    },
}

#[derive(Subcommand)]
pub enum StalksCommand {
    List,

    Show { name: String },
}
