use super::{db_target, print_json};
use crate::args::TargetArgs;
use anyhow::Result;
use dbagent_runtime::{DatabaseServer, TracingRecorder};

pub fn processes(server: &DatabaseServer, target: &TargetArgs) -> Result<()> {
    print_json(&server.processes(&db_target(server, target)))
}

pub fn variables(server: &DatabaseServer, target: &TargetArgs) -> Result<()> {
    print_json(&server.variables(&db_target(server, target)))
}

pub fn locks(server: &DatabaseServer, target: &TargetArgs) -> Result<()> {
    print_json(&server.locks(&db_target(server, target)))
}

pub fn kill(server: &DatabaseServer, target: &TargetArgs, threshold: i64) -> Result<()> {
    print_json(&server.kill_processes(&db_target(server, target), threshold))
}

pub fn deadlocks(
    server: &DatabaseServer,
    target: &TargetArgs,
    database: &str,
    start: &str,
    stop: &str,
    max_lines: u32,
) -> Result<()> {
    let target = db_target(server, target);
    print_json(&server.deadlocks(&target, database, start, stop, max_lines))
}

/// `null` when the server rejected the statement
pub fn explain(server: &DatabaseServer, target: &TargetArgs, database: &str, query: &str) -> Result<()> {
    print_json(&server.explain_query(&db_target(server, target), database, query))
}

pub fn column_stats(
    server: &DatabaseServer,
    target: &TargetArgs,
    schema: &str,
    table: &str,
    doc_name: &str,
) -> Result<()> {
    let target = db_target(server, target);
    print_json(&server.column_statistics_job(&TracingRecorder, schema, table, &target, doc_name)?)
}
