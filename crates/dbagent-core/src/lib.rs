// Leaf collaborators: everything that touches the OS or the live server.
// Each is a trait so the runtime can be exercised against fakes.

pub mod cpu;
pub mod error;
pub mod path;
pub mod shell;
pub mod sql;

pub use cpu::{CpuSampler, ProcStatSampler};
pub use error::{Error, Result};
pub use path::{BINLOG_INDEX_FILE, expand_tilde, is_binlog_name};
pub use shell::{CommandOutput, CommandSpec, ShellExecutor, SystemShell};
pub use sql::{MariadbConnector, SqlConnection, SqlConnector, SqlParam, quote_identifier};
