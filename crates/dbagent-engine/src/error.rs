use std::fmt;

/// Result type for dbagent-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing tool output
#[derive(Debug)]
pub enum Error {
    /// `SET TIMESTAMP` marker whose value is not an integer epoch
    InvalidTimestamp(String),

    /// Caller-supplied search pattern failed to compile
    Pattern(regex::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTimestamp(marker) => write!(f, "Invalid timestamp marker: {}", marker),
            Error::Pattern(err) => write!(f, "Invalid search pattern: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pattern(err) => Some(err),
            Error::InvalidTimestamp(_) => None,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::Pattern(err)
    }
}
