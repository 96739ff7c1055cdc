use crate::{DatabaseServer, Result};
use chrono::{DateTime, Utc};
use dbagent_core::{BINLOG_INDEX_FILE, is_binlog_name};
use dbagent_types::{BinlogFile, BinlogSnapshot};
use std::path::Path;
use walkdir::WalkDir;

impl DatabaseServer {
    /// Binlogs in the data directory, ascending by name.
    pub fn list_binlogs(&self) -> Result<Vec<BinlogFile>> {
        let mut binlogs = Vec::new();

        for entry in WalkDir::new(&self.config.mariadb_dir)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !entry.file_type().is_file() || !is_binlog_name(name) {
                continue;
            }

            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            binlogs.push(BinlogFile {
                name: name.to_string(),
                size: metadata.len(),
                modified_at: DateTime::<Utc>::from(metadata.modified()?),
            });
        }

        binlogs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(binlogs)
    }

    /// The binlog MariaDB is writing to, from the last entry of its index file.
    ///
    /// A missing, empty or unreadable index file yields `None`.
    pub fn current_binlog(&self) -> Option<String> {
        let index_file = self.config.mariadb_dir.join(BINLOG_INDEX_FILE);
        match std::fs::read_to_string(&index_file) {
            Ok(content) => current_from_index(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %index_file.display(), error = %err, "cannot read binlog index");
                None
            }
        }
    }

    /// Disk, index and current-binlog views, each read independently.
    pub fn get_binlogs(&self) -> Result<BinlogSnapshot> {
        Ok(BinlogSnapshot {
            binlogs_in_disk: self.list_binlogs()?,
            indexed_binlogs: self.indexer.indexed_binlogs()?,
            current_binlog: self.current_binlog(),
        })
    }
}

/// Entries are written as paths (`./mysql-bin.000042` or absolute)
fn current_from_index(content: &str) -> Option<String> {
    let last = content.lines().map(str::trim).rfind(|line| !line.is_empty())?;
    Path::new(last)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}
