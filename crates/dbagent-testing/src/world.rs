//! TestWorld pattern for CLI integration tests.
//!
//! Provides:
//! - An isolated host layout (see `fixtures`)
//! - A `config.toml` in the agent directory pointing at it
//! - Execution of the `dbagent` binary against that config

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::fixtures::HostDirs;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use dbagent_testing::TestWorld;
///
/// let world = TestWorld::new()
///     .with_binlog("mysql-bin.000001", b"...")
///     .with_binlog_index(&["mysql-bin.000001"]);
///
/// let result = world.run(&["binlogs", "list"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    dirs: HostDirs,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment with its config written.
    pub fn new() -> Self {
        let dirs = HostDirs::new().expect("Failed to create host directories");
        let world = Self {
            dirs,
            env_vars: HashMap::new(),
        };
        world
            .dirs
            .config()
            .save_to(&world.config_path())
            .expect("Failed to write config");
        world
    }

    pub fn dirs(&self) -> &HostDirs {
        &self.dirs
    }

    pub fn config_path(&self) -> PathBuf {
        self.dirs.agent_dir().join("config.toml")
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn with_binlog(self, name: &str, content: &[u8]) -> Self {
        self.dirs.binlog(name, content).expect("Failed to write binlog");
        self
    }

    pub fn with_binlog_index(self, names: &[&str]) -> Self {
        self.dirs
            .binlog_index(names)
            .expect("Failed to write binlog index");
        self
    }

    pub fn with_stalk_file(self, file_name: &str, content: &[u8]) -> Self {
        self.dirs
            .stalk_file(file_name, content)
            .expect("Failed to write stalk file");
        self
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--config").arg(self.config_path());
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("DBAGENT_PATH");
        cmd.env_remove("DBAGENT_MARIADB_ROOT_PASSWORD");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the `dbagent` binary and capture its output.
    ///
    /// # Note
    /// This method uses `Command::cargo_bin()`, which relies on cargo having
    /// built the binary for the test run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("dbagent")
            .map_err(|e| anyhow::anyhow!("Failed to find dbagent binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}
