// Parsing of `mariadb-binlog --short-form` output.
//
// The tool emits statement blocks terminated by `/*!*/;`, each optionally
// preceded by session boilerplate and a `SET TIMESTAMP=<epoch>` marker.
// Statements never carry a timestamp of their own; they inherit the last
// marker seen, so both parsers here thread that marker through the stream.

mod blocks;
pub mod error;
pub mod search;
pub mod statement;

pub use blocks::{STATEMENT_DELIMITER, format_timestamp, parse_timestamp_marker};
pub use error::{Error, Result};
pub use search::{compile_pattern, search_events, strip_noise};
pub use statement::{ParsedStatement, classify, parse_statements};
