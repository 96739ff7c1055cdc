use crate::{DatabaseServer, Error, Result};
use chrono::NaiveDateTime;
use dbagent_types::{StalkFile, StalkSummary};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use walkdir::WalkDir;

const STALK_NAME_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

static STALK_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}_\d{2}_\d{2}_\d{2}_\d{2}_\d{2})-output").unwrap());

static STALK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}_\d{2}_\d{2}_\d{2}_\d{2}_\d{2}$").unwrap());

impl DatabaseServer {
    /// Captures in the pt-stalk directory, ascending by name.
    pub fn get_stalks(&self) -> Result<Vec<StalkSummary>> {
        let mut stalks = BTreeMap::new();

        for name in self.stalk_file_names()? {
            let Some(caps) = STALK_FILE.captures(&name) else {
                continue;
            };
            let stalk = &caps[1];
            if stalks.contains_key(stalk) {
                continue;
            }
            let Ok(captured_at) = NaiveDateTime::parse_from_str(stalk, STALK_NAME_FORMAT) else {
                tracing::debug!(file = %name, "skipping stalk with impossible timestamp");
                continue;
            };
            stalks.insert(stalk.to_string(), captured_at.and_utc().to_rfc3339());
        }

        Ok(stalks
            .into_iter()
            .map(|(name, timestamp)| StalkSummary { name, timestamp })
            .collect())
    }

    /// Every file of the capture `name`, sorted by type.
    ///
    /// Files over the configured size cap are left out.
    pub fn get_stalk(&self, name: &str) -> Result<Vec<StalkFile>> {
        if !STALK_NAME.is_match(name) {
            return Err(Error::InvalidInput(format!("not a stalk name: {:?}", name)));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.config.pt_stalk_dir)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !entry.file_type().is_file() || !file_name.starts_with(name) {
                continue;
            }

            let size = entry.metadata().map_err(std::io::Error::from)?.len();
            if size > self.config.stalk_max_file_bytes {
                tracing::debug!(file = file_name, size, "skipping oversized stalk file");
                continue;
            }

            let bytes = std::fs::read(entry.path())?;
            files.push(StalkFile {
                kind: file_name.replacen(name, "", 1).trim_matches('-').to_string(),
                text: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        files.sort_by(|a, b| a.kind.cmp(&b.kind));
        Ok(files)
    }

    fn stalk_file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.config.pt_stalk_dir)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}
