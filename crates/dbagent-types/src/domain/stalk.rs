use serde::{Deserialize, Serialize};

/// A pt-stalk capture, identified by its `YYYY_MM_DD_HH_MM_SS` prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalkSummary {
    pub name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}

/// One diagnostic file from a capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalkFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}
