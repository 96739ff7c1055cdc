pub mod archive;
pub mod binlogs;
pub mod diagnostics;
pub mod index;
pub mod stalks;

use anyhow::Result;
use dbagent_runtime::DatabaseServer;
use dbagent_types::DbTarget;
use serde::Serialize;

use crate::args::TargetArgs;

/// Every command answers with pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn db_target(server: &DatabaseServer, args: &TargetArgs) -> DbTarget {
    server.config().target(args.host.clone(), args.password.clone())
}
