use crate::Result;
use crate::blocks::{Block, TimestampState, blocks, filter_lines};
use dbagent_types::QueryType;
use regex::Regex;
use std::sync::LazyLock;

// Unlike search, `use` lines are kept: they carry the database context.
static BOILERPLATE_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(COMMIT|BEGIN|START TRANSACTION|DELIMITER|ROLLBACK|#)").unwrap()
});

static USE_DATABASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^use\s+`?([^`\s]+)`?\s*;?$").unwrap());

static TARGET_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(?:insert\s+(?:ignore\s+)?(?:into\s+)?|replace\s+(?:into\s+)?|update\s+(?:ignore\s+)?|delete\s+(?:ignore\s+)?from\s+)((?:`[^`]+`|[\w$]+)(?:\s*\.\s*(?:`[^`]+`|[\w$]+))?)",
    )
    .unwrap()
});

/// A statement lifted from a whole binlog for the query index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub database: Option<String>,
    pub table: Option<String>,
    pub timestamp: i64,
    pub kind: QueryType,
    pub query: String,
}

/// Parse unfiltered extraction output into indexable statements.
///
/// Tracks the active database from `use` blocks and the active timestamp
/// from markers; statements before the first marker are skipped.
pub fn parse_statements(output: &str) -> Result<Vec<ParsedStatement>> {
    let text = filter_lines(output, &BOILERPLATE_LINES);
    let mut state = TimestampState::NoTimestamp;
    let mut database: Option<String> = None;
    let mut statements = Vec::new();

    for block in blocks(&text) {
        match block? {
            Block::Timestamp(ts) => state = TimestampState::from_marker(ts),
            Block::Preamble => continue,
            Block::Statement(query) => {
                if let Some(caps) = USE_DATABASE.captures(query) {
                    database = Some(caps[1].to_string());
                    continue;
                }
                let Some(ts) = state.current() else {
                    continue;
                };
                let (qualifier, table) = target_table(query);
                statements.push(ParsedStatement {
                    database: qualifier.or_else(|| database.clone()),
                    table,
                    timestamp: ts,
                    kind: classify(query),
                    query: query.to_string(),
                });
            }
        }
    }

    Ok(statements)
}

/// Statement kind from its leading keyword
pub fn classify(query: &str) -> QueryType {
    let keyword = query
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    match keyword.as_str() {
        "insert" | "replace" => QueryType::Insert,
        "update" => QueryType::Update,
        "delete" => QueryType::Delete,
        "select" => QueryType::Select,
        _ => QueryType::Other,
    }
}

/// `(database qualifier, table)` targeted by a DML statement
fn target_table(query: &str) -> (Option<String>, Option<String>) {
    let Some(caps) = TARGET_TABLE.captures(query) else {
        return (None, None);
    };
    let parts: Vec<String> = caps[1]
        .split('.')
        .map(|part| part.trim().trim_matches('`').to_string())
        .collect();

    match parts.as_slice() {
        [table] => (None, Some(table.clone())),
        [db, table] => (Some(db.clone()), Some(table.clone())),
        _ => (None, None),
    }
}
