use super::print_json;
use anyhow::{Context, Result};
use dbagent_runtime::{DatabaseServer, TracingRecorder};
use dbagent_types::RowIdGroups;

pub fn add(server: &DatabaseServer, binlogs: &[String]) -> Result<()> {
    print_json(&server.add_binlogs_to_index_job(&TracingRecorder, binlogs))
}

pub fn remove(server: &DatabaseServer, binlogs: &[String]) -> Result<()> {
    print_json(&server.remove_binlogs_from_index_job(&TracingRecorder, binlogs))
}

pub fn timeline(
    server: &DatabaseServer,
    start: i64,
    end: i64,
    database: Option<&str>,
    kind: Option<&str>,
) -> Result<()> {
    print_json(&server.get_timeline(start, end, database, kind)?)
}

pub fn row_ids(
    server: &DatabaseServer,
    start: i64,
    end: i64,
    kind: &str,
    database: &str,
    table: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    print_json(&server.get_row_ids(start, end, kind, database, table, search)?)
}

pub fn queries(server: &DatabaseServer, database: &str, row_ids: &str) -> Result<()> {
    let row_ids: RowIdGroups =
        serde_json::from_str(row_ids).context("--row-ids must be a JSON object of id lists")?;
    print_json(&server.get_queries(&row_ids, database)?)
}
