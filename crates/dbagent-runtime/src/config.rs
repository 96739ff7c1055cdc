use crate::{Error, Result};
use dbagent_core::expand_tilde;
use dbagent_types::DbTarget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolve the agent directory based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. DBAGENT_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.dbagent (fallback for systems without XDG)
pub fn resolve_agent_dir(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("DBAGENT_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("dbagent"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".dbagent"));
    }

    Err(Error::Config(
        "Could not determine agent directory: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Host agent settings.
///
/// Relative paths are resolved against the directory holding the config
/// file, so the default `index_dir` lands next to `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    /// MariaDB data directory holding `mysql-bin.*` and `mysql-bin.index`
    pub mariadb_dir: PathBuf,
    /// pt-stalk capture directory
    pub pt_stalk_dir: PathBuf,
    pub index_dir: PathBuf,
    pub index_file: String,
    /// Scratch space for compressed binlogs; system temp when missing
    pub tmp_dir: PathBuf,
    /// Extraction tool (`mariadb-binlog` or `mysqlbinlog`)
    pub binlog_tool: String,
    /// Indexing is skipped above this busy percentage
    pub index_cpu_threshold: f32,
    pub cpu_sample_secs: u64,
    /// Stalk files larger than this are left out of `get_stalk`
    pub stalk_max_file_bytes: u64,
    pub mariadb_port: u16,
    pub mariadb_user: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "db-agent".to_string(),
            mariadb_dir: PathBuf::from("/var/lib/mysql"),
            pt_stalk_dir: PathBuf::from("/var/lib/pt-stalk"),
            index_dir: PathBuf::from("binlog-indexes"),
            index_file: "queries.db".to_string(),
            tmp_dir: PathBuf::from("/opt/volumes/mariadb/tmp"),
            binlog_tool: "mariadb-binlog".to_string(),
            index_cpu_threshold: 50.0,
            cpu_sample_secs: 5,
            stalk_max_file_bytes: 16 * 1024 * 1024,
            mariadb_port: 3306,
            mariadb_user: "root".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn load(agent_dir: &Path) -> Result<Self> {
        Self::load_from(&Self::default_path(agent_dir))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path(agent_dir: &Path) -> PathBuf {
        agent_dir.join("config.toml")
    }

    /// Expand `~/` and anchor relative paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.mariadb_dir,
            &mut self.pt_stalk_dir,
            &mut self.index_dir,
            &mut self.tmp_dir,
        ] {
            let expanded = path.to_str().map(expand_tilde).unwrap_or_else(|| path.clone());
            *path = if expanded.is_relative() {
                base.join(expanded)
            } else {
                expanded
            };
        }
    }

    pub fn index_path(&self) -> PathBuf {
        self.index_dir.join(&self.index_file)
    }

    pub fn binlog_path(&self, name: &str) -> PathBuf {
        self.mariadb_dir.join(name)
    }

    /// Directory for short-lived compressed artifacts
    pub fn scratch_dir(&self) -> PathBuf {
        if self.tmp_dir.is_dir() {
            self.tmp_dir.clone()
        } else {
            std::env::temp_dir()
        }
    }

    /// Administrative connection to the server at `host`
    pub fn target(&self, host: impl Into<String>, password: impl Into<String>) -> DbTarget {
        DbTarget {
            host: host.into(),
            port: self.mariadb_port,
            user: self.mariadb_user.clone(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = AgentConfig::default();
        assert_eq!(config.mariadb_dir, PathBuf::from("/var/lib/mysql"));
        assert_eq!(config.index_cpu_threshold, 50.0);
        assert_eq!(config.stalk_max_file_bytes, 16_777_216);
    }

    #[test]
    fn test_load_nonexistent_returns_default_anchored_at_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let config = AgentConfig::load_from(&config_path)?;
        assert_eq!(config.name, "db-agent");
        assert_eq!(
            config.index_path(),
            temp_dir.path().join("binlog-indexes").join("queries.db")
        );

        Ok(())
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = AgentConfig {
            name: "db-17".to_string(),
            mariadb_dir: PathBuf::from("/data/mysql"),
            index_cpu_threshold: 75.0,
            ..AgentConfig::default()
        };
        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = AgentConfig::load_from(&config_path)?;
        assert_eq!(loaded.name, "db-17");
        assert_eq!(loaded.mariadb_dir, PathBuf::from("/data/mysql"));
        assert_eq!(loaded.index_cpu_threshold, 75.0);

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "binlog_tool = \"mysqlbinlog\"\nmariadb_port = 3307\n")?;

        let config = AgentConfig::load_from(&config_path)?;
        assert_eq!(config.binlog_tool, "mysqlbinlog");
        assert_eq!(config.mariadb_port, 3307);
        assert_eq!(config.pt_stalk_dir, PathBuf::from("/var/lib/pt-stalk"));

        let target = config.target("10.0.0.5", "pw");
        assert_eq!(target.port, 3307);
        assert_eq!(target.user, "root");

        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "mariadb_port = \"not a port\"").unwrap();

        let err = AgentConfig::load_from(&config_path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_scratch_dir_falls_back_to_system_temp() {
        let config = AgentConfig {
            tmp_dir: PathBuf::from("/nonexistent/dbagent-scratch"),
            ..AgentConfig::default()
        };
        assert_eq!(config.scratch_dir(), std::env::temp_dir());
    }
}
