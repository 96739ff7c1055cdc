use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Index file MariaDB keeps next to the binlogs, one live binlog per line
pub const BINLOG_INDEX_FILE: &str = "mysql-bin.index";

static BINLOG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mysql-bin\.\d+$").unwrap());

/// True for rotation-produced binlog names such as `mysql-bin.000123`.
///
/// Every operation that turns a caller-supplied name into a path or a
/// statement checks this first, so names never carry separators or quotes.
pub fn is_binlog_name(name: &str) -> bool {
    BINLOG_NAME.is_match(name)
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binlog_name_accepts_rotation_names() {
        assert!(is_binlog_name("mysql-bin.000001"));
        assert!(is_binlog_name("mysql-bin.1234567"));
    }

    #[test]
    fn test_binlog_name_rejects_everything_else() {
        assert!(!is_binlog_name("mysql-bin.index"));
        assert!(!is_binlog_name("mysql-bin.000001.gz"));
        assert!(!is_binlog_name("../mysql-bin.000001"));
        assert!(!is_binlog_name("mysql-bin.000001'; DROP TABLE x; --"));
        assert!(!is_binlog_name("mysql-binX000001"));
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/lib/mysql"), PathBuf::from("/var/lib/mysql"));
    }
}
