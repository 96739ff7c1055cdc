// SQLite query index
// One row per statement, keyed by the binlog it was read from

mod db;
pub mod error;
mod queries;
mod records;
mod schema;

// Public API
pub use db::Database;
pub use error::{Error, Result};
pub use records::QueryRecord;
pub use schema::SCHEMA_VERSION;
