mod args;
mod commands;
mod handlers;
pub mod types;

pub use args::{BinlogsCommand, Cli, Commands, IndexCommand, StalksCommand, TargetArgs};
pub use commands::run;
