use rusqlite::ErrorCode;
use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Sqlite(rusqlite::Error),

    /// The directory holding the index file could not be created
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Another connection holds the index file's write lock
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Error::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Sqlite(err) if self.is_busy() => {
                write!(f, "Query index is busy, another job is writing to it: {}", err)
            }
            Error::Sqlite(err) => write!(f, "Query index error: {}", err),
            Error::CreateDir { path, source } => {
                write!(f, "Cannot create index directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Sqlite(err) => Some(err),
            Error::CreateDir { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}
