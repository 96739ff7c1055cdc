use serde::{Deserialize, Serialize};

/// One result row: column name to value.
///
/// MariaDB's text protocol returns most values as strings, so callers that
/// need numbers should go through the `row_*` helpers in the runtime.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Administrative connection target for the live server
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTarget {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    pub password: String,
}

fn default_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

impl DbTarget {
    /// Root connection on the default port
    pub fn root(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            user: default_user(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for DbTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-column statistics payload, serialized as JSON text for the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub output: String,
}
