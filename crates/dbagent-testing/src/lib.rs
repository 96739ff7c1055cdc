//! Testing infrastructure for dbagent integration tests.
//!
//! This crate provides:
//! - `fakes`: In-memory stand-ins for every collaborator `DatabaseServer` uses
//! - `fixtures`: MariaDB data, pt-stalk and scratch directories on disk
//! - `TestWorld`: Isolated agent directory for running the CLI

pub mod fakes;
pub mod fixtures;
pub mod world;

pub use fakes::FakeHost;
pub use fixtures::HostDirs;
pub use world::{CliResult, TestWorld};
