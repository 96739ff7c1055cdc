use std::fmt;

/// Result type for dbagent-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised by the leaf collaborators
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// External command exited unsuccessfully
    Command {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Database connection or statement failed
    Sql(mysql::Error),

    /// CPU accounting could not be read
    Cpu(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Command {
                program,
                code,
                stderr,
            } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(f, "Command '{}' failed ({}): {}", program, code, stderr.trim())
            }
            Error::Sql(err) => write!(f, "SQL error: {}", err),
            Error::Cpu(msg) => write!(f, "CPU sampling error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Sql(err) => Some(err),
            Error::Command { .. } | Error::Cpu(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<mysql::Error> for Error {
    fn from(err: mysql::Error) -> Self {
        Error::Sql(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_message_includes_exit_code_and_stderr() {
        let err = Error::Command {
            program: "mariadb-binlog".to_string(),
            code: Some(1),
            stderr: "File not found\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command 'mariadb-binlog' failed (1): File not found"
        );
    }

    #[test]
    fn test_command_error_killed_by_signal() {
        let err = Error::Command {
            program: "gzip".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("(signal)"));
    }
}
