use super::{db_target, print_json};
use crate::args::TargetArgs;
use anyhow::Result;
use dbagent_runtime::DatabaseServer;

pub fn list(server: &DatabaseServer) -> Result<()> {
    print_json(&server.list_binlogs()?)
}

pub fn current(server: &DatabaseServer) -> Result<()> {
    print_json(&server.current_binlog())
}

pub fn snapshot(server: &DatabaseServer) -> Result<()> {
    print_json(&server.get_binlogs()?)
}

pub fn search(
    server: &DatabaseServer,
    binlog: &str,
    database: &str,
    start: &str,
    stop: &str,
    pattern: &str,
    max_lines: usize,
) -> Result<()> {
    let events = server.search_binary_log(binlog, database, start, stop, pattern, max_lines)?;
    print_json(&events)
}

/// Prints `true` or `false`; a refused purge is not a process failure.
pub fn purge(server: &DatabaseServer, target: &TargetArgs, to_binlog: &str) -> Result<()> {
    print_json(&server.purge_binlog(&db_target(server, target), to_binlog))
}
