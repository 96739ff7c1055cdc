use super::print_json;
use anyhow::{Context, Result};
use dbagent_runtime::{DatabaseServer, TracingRecorder};
use dbagent_types::OffsiteConfig;
use std::path::Path;

pub fn upload(server: &DatabaseServer, binlogs: &[String], offsite: &Path) -> Result<()> {
    let content = std::fs::read_to_string(offsite)
        .with_context(|| format!("Failed to read {}", offsite.display()))?;
    let offsite: OffsiteConfig = serde_json::from_str(&content)
        .with_context(|| format!("Invalid offsite config in {}", offsite.display()))?;

    print_json(&server.upload_binlogs_to_s3_job(&TracingRecorder, binlogs, &offsite)?)
}
