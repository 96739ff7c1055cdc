pub mod query;
pub mod timeline;
