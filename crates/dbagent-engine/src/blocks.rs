use crate::{Error, Result};
use chrono::DateTime;
use regex::Regex;

/// Terminator the extraction tool appends to every statement
pub const STATEMENT_DELIMITER: &str = "/*!*/;";

const TIMESTAMP_MARKER: &str = "SET TIMESTAMP";

/// Running marker threaded through a parse loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimestampState {
    NoTimestamp,
    Established(i64),
}

impl TimestampState {
    /// State after a `SET TIMESTAMP` marker; epoch 0 means the tool had none
    pub(crate) fn from_marker(timestamp: i64) -> Self {
        if timestamp == 0 {
            TimestampState::NoTimestamp
        } else {
            TimestampState::Established(timestamp)
        }
    }

    pub(crate) fn current(&self) -> Option<i64> {
        match self {
            TimestampState::NoTimestamp => None,
            TimestampState::Established(ts) => Some(*ts),
        }
    }
}

/// What a single delimited block means to a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    Timestamp(i64),
    /// Session `SET` or a versioned `/*!` directive
    Preamble,
    Statement(&'a str),
}

/// Drop every line matched by `skip`, keeping line structure for the rest
pub(crate) fn filter_lines(output: &str, skip: &Regex) -> String {
    let mut kept = String::with_capacity(output.len());
    for line in output.lines() {
        if skip.is_match(line) {
            continue;
        }
        kept.push_str(line);
        kept.push('\n');
    }
    kept
}

/// Split filtered output on the statement delimiter and classify each block.
///
/// Self-terminated versioned directives (`/*!40019 SET ...*/;`) at the head of
/// a block are session setup emitted before the first event; they are peeled
/// off so the marker or statement that follows them is still seen.
pub(crate) fn blocks(text: &str) -> impl Iterator<Item = Result<Block<'_>>> {
    text.split(STATEMENT_DELIMITER)
        .map(|raw| strip_directives(raw.trim()))
        .filter(|block| !block.is_empty())
        .map(classify_block)
}

fn strip_directives(mut block: &str) -> &str {
    loop {
        let first_line = block.lines().next().unwrap_or("");
        if first_line.starts_with("/*!") && first_line.trim_end().ends_with("*/;") {
            block = block[first_line.len()..].trim_start();
        } else {
            return block;
        }
    }
}

fn classify_block(block: &str) -> Result<Block<'_>> {
    if block.starts_with(TIMESTAMP_MARKER) {
        return parse_timestamp_marker(block).map(Block::Timestamp);
    }
    if block.starts_with("SET") || block.starts_with("/*!") {
        return Ok(Block::Preamble);
    }
    Ok(Block::Statement(block))
}

/// Parse `SET TIMESTAMP=<epoch>[.fraction]`, truncating the fraction
pub fn parse_timestamp_marker(block: &str) -> Result<i64> {
    let value = block.rsplit('=').next().unwrap_or("");
    let whole = value.split('.').next().unwrap_or("").trim();
    whole
        .parse::<i64>()
        .map_err(|_| Error::InvalidTimestamp(block.to_string()))
}

/// Render an epoch as UTC with second precision (`2024-01-01 00:00:00`)
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}
