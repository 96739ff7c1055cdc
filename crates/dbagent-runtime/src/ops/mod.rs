// DatabaseServer operations, one module per concern.

pub mod archive;
pub mod diagnostics;
pub mod discovery;
pub mod indexing;
pub mod retention;
pub mod search;
pub mod stalks;
