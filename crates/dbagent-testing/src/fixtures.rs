//! On-disk layout of a MariaDB host.
//!
//! Everything lives under one temporary root:
//! - `mysql/`: binlogs and `mysql-bin.index`
//! - `pt-stalk/`: diagnostic captures
//! - `tmp/`: scratch space for compressed binlogs
//! - `agent/`: agent directory holding the query index

use anyhow::Result;
use dbagent_runtime::AgentConfig;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct HostDirs {
    root: TempDir,
}

impl HostDirs {
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        for dir in ["mysql", "pt-stalk", "tmp", "agent"] {
            fs::create_dir_all(root.path().join(dir))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn mariadb_dir(&self) -> PathBuf {
        self.root().join("mysql")
    }

    pub fn stalk_dir(&self) -> PathBuf {
        self.root().join("pt-stalk")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root().join("tmp")
    }

    pub fn agent_dir(&self) -> PathBuf {
        self.root().join("agent")
    }

    /// Config pointing every directory into this root, with no CPU sample wait
    pub fn config(&self) -> AgentConfig {
        AgentConfig {
            mariadb_dir: self.mariadb_dir(),
            pt_stalk_dir: self.stalk_dir(),
            tmp_dir: self.tmp_dir(),
            index_dir: self.agent_dir().join("binlog-indexes"),
            cpu_sample_secs: 0,
            ..AgentConfig::default()
        }
    }

    /// Write a binlog into the data directory
    pub fn binlog(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.mariadb_dir().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a binlog with a fixed modification time (unix seconds)
    pub fn binlog_modified(&self, name: &str, content: &[u8], unix_secs: i64) -> Result<PathBuf> {
        let path = self.binlog(name, content)?;
        filetime::set_file_mtime(&path, FileTime::from_unix_time(unix_secs, 0))?;
        Ok(path)
    }

    /// Write `mysql-bin.index` listing `names` the way MariaDB does
    pub fn binlog_index(&self, names: &[&str]) -> Result<()> {
        let content: String = names.iter().map(|n| format!("./{}\n", n)).collect();
        fs::write(self.mariadb_dir().join("mysql-bin.index"), content)?;
        Ok(())
    }

    pub fn stalk_file(&self, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.stalk_dir().join(file_name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Stalk file of `size` bytes without writing them (sparse)
    pub fn sparse_stalk_file(&self, file_name: &str, size: u64) -> Result<PathBuf> {
        let path = self.stalk_dir().join(file_name);
        fs::File::create(&path)?.set_len(size)?;
        Ok(path)
    }

    /// Names of everything left in the scratch directory
    pub fn tmp_entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.tmp_dir())? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
