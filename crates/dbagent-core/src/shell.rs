use crate::{Error, Result};
use std::process::Command;

/// Program plus argument vector; never passed through a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs OS commands to completion and captures their output
pub trait ShellExecutor: Send + Sync {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// `std::process::Command` backed executor
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl ShellExecutor for SystemShell {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(command = %command, "running command");

        let output = Command::new(&command.program)
            .args(&command.args)
            .output()?;

        // Binlog output can carry arbitrary bytes inside string literals
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Error::Command {
                program: command.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
