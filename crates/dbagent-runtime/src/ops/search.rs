use crate::{DatabaseServer, Error, Result};
use chrono::NaiveDateTime;
use dbagent_core::CommandSpec;
use dbagent_engine::{compile_pattern, search_events};
use dbagent_types::LogEvent;

const TOOL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl DatabaseServer {
    /// Statements in `binlog` for `database` between `start` and `stop`
    /// (inclusive) that match `pattern`.
    ///
    /// Returns at most `max_lines + 1` events.
    pub fn search_binary_log(
        &self,
        binlog: &str,
        database: &str,
        start: &str,
        stop: &str,
        pattern: &str,
        max_lines: usize,
    ) -> Result<Vec<LogEvent>> {
        let path = self.binlog_path(binlog)?;
        let pattern = compile_pattern(pattern)?;

        let command = CommandSpec::new(&self.config.binlog_tool)
            .arg("--short-form")
            .args(["--database", database])
            .args(["--start-datetime", tool_datetime(start)?.as_str()])
            .args(["--stop-datetime", tool_datetime(stop)?.as_str()])
            .arg(path.to_string_lossy());

        let output = self.shell.run(&command)?;
        let events = search_events(&output.stdout, &pattern, max_lines)?;

        tracing::debug!(binlog, database, events = events.len(), "searched binlog");
        Ok(events)
    }
}

/// Normalize `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS` for the tool
fn tool_datetime(value: &str) -> Result<String> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.format(TOOL_DATETIME_FORMAT).to_string())
        .ok_or_else(|| Error::InvalidInput(format!("not a datetime: {:?}", value)))
}
