use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offsite destination as sent by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsiteConfig {
    pub bucket: String,
    /// Key prefix; objects land at `<path>/<binlog>.gz`
    pub path: String,
    pub auth: OffsiteAuth,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsiteAuth {
    #[serde(rename = "ACCESS_KEY")]
    pub access_key: String,
    #[serde(rename = "SECRET_KEY")]
    pub secret_key: String,
    #[serde(rename = "REGION", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

// Keep credentials out of logs and panic messages.
impl std::fmt::Debug for OffsiteAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffsiteAuth")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

impl OffsiteConfig {
    /// Object key for a binlog under the configured prefix
    pub fn object_key(&self, binlog: &str) -> String {
        let prefix = self.path.trim_end_matches('/');
        if prefix.is_empty() {
            format!("{}.gz", binlog)
        } else {
            format!("{}/{}.gz", prefix, binlog)
        }
    }
}

/// A binlog that reached offsite storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsiteFile {
    /// Compressed size in bytes
    pub size: u64,
    pub path: String,
}

/// Outcome of an archival batch.
///
/// Every requested binlog appears in exactly one of the two maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub offsite_files: BTreeMap<String, OffsiteFile>,
    pub failed_uploads: BTreeMap<String, String>,
}

impl ArchiveReport {
    pub fn len(&self) -> usize {
        self.offsite_files.len() + self.failed_uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
