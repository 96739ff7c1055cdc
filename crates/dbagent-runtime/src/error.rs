use std::fmt;

/// Result type for dbagent-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Shell, SQL or CPU collaborator failed
    Core(dbagent_core::Error),

    /// Query index failed
    Index(dbagent_index::Error),

    /// Extraction output could not be parsed
    Engine(dbagent_engine::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Caller-supplied value rejected before touching disk or server
    InvalidInput(String),

    /// Offsite storage client or upload failed
    Storage(String),

    /// Payload could not be serialized
    Serialization(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Core(err) => write!(f, "{}", err),
            Error::Index(err) => write!(f, "Index error: {}", err),
            Error::Engine(err) => write!(f, "Parse error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Serialization(err) => write!(f, "Serialization error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Core(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Serialization(err) => Some(err),
            Error::Config(_) | Error::InvalidInput(_) | Error::Storage(_) => None,
        }
    }
}

impl From<dbagent_core::Error> for Error {
    fn from(err: dbagent_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<dbagent_index::Error> for Error {
    fn from(err: dbagent_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<dbagent_engine::Error> for Error {
    fn from(err: dbagent_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
