use dbagent_testing::fakes::{FakeHost, RecordingIndexer};
use dbagent_testing::HostDirs;
use dbagent_types::DbTarget;

fn target() -> DbTarget {
    DbTarget::root("10.0.0.5", "root-password")
}

#[test]
fn test_list_binlogs_sorted_and_filtered() {
    let dirs = HostDirs::new().unwrap();
    dirs.binlog_modified("mysql-bin.000010", b"0123456789", 1704067200)
        .unwrap();
    dirs.binlog("mysql-bin.000002", b"ab").unwrap();
    dirs.binlog("mysql-bin.000009", b"").unwrap();
    dirs.binlog("ib_logfile0", b"innodb").unwrap();
    dirs.binlog("mysql-bin.000003.gz", b"").unwrap();
    dirs.binlog_index(&["mysql-bin.000002", "mysql-bin.000009", "mysql-bin.000010"])
        .unwrap();

    let server = FakeHost::new().server(dirs.config());
    let binlogs = server.list_binlogs().unwrap();

    let names: Vec<&str> = binlogs.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["mysql-bin.000002", "mysql-bin.000009", "mysql-bin.000010"]
    );
    assert_eq!(binlogs[2].size, 10);
    assert_eq!(binlogs[2].modified_at.timestamp(), 1704067200);
}

#[test]
fn test_list_binlogs_missing_directory_is_error() {
    let dirs = HostDirs::new().unwrap();
    let mut config = dirs.config();
    config.mariadb_dir = dirs.root().join("absent");

    let server = FakeHost::new().server(config);
    assert!(server.list_binlogs().is_err());
}

#[test]
fn test_current_binlog_from_index_file() {
    let dirs = HostDirs::new().unwrap();
    let server = FakeHost::new().server(dirs.config());
    assert_eq!(server.current_binlog(), None);

    dirs.binlog_index(&[]).unwrap();
    assert_eq!(server.current_binlog(), None);

    dirs.binlog_index(&["mysql-bin.000001", "mysql-bin.000002"])
        .unwrap();
    assert_eq!(server.current_binlog().as_deref(), Some("mysql-bin.000002"));
}

#[test]
fn test_get_binlogs_views_are_independent() {
    let dirs = HostDirs::new().unwrap();
    dirs.binlog("mysql-bin.000002", b"x").unwrap();
    dirs.binlog("mysql-bin.000003", b"x").unwrap();
    dirs.binlog_index(&["mysql-bin.000002", "mysql-bin.000003"])
        .unwrap();

    // 000001 was indexed and has since been purged from disk
    let host = FakeHost::with_indexer(RecordingIndexer::with_indexed(&[
        "mysql-bin.000002",
        "mysql-bin.000001",
    ]));
    let snapshot = host.server(dirs.config()).get_binlogs().unwrap();

    assert_eq!(snapshot.binlogs_in_disk.len(), 2);
    assert_eq!(
        snapshot.indexed_binlogs,
        vec!["mysql-bin.000001", "mysql-bin.000002"]
    );
    assert_eq!(snapshot.current_binlog.as_deref(), Some("mysql-bin.000003"));
}

#[test]
fn test_purge_issues_statement_on_mysql_database() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    let server = host.server(dirs.config());

    assert!(server.purge_binlog(&target(), "mysql-bin.000007"));
    assert_eq!(host.sql.connections(), vec!["mysql"]);
    assert_eq!(
        host.sql.sql_log(),
        vec!["PURGE BINARY LOGS TO 'mysql-bin.000007'"]
    );
}

#[test]
fn test_purge_failures_are_false() {
    let dirs = HostDirs::new().unwrap();

    let host = FakeHost::new();
    host.sql.fail_on("PURGE");
    assert!(!host.server(dirs.config()).purge_binlog(&target(), "mysql-bin.000007"));

    let host = FakeHost::new();
    host.sql.refuse_connections();
    assert!(!host.server(dirs.config()).purge_binlog(&target(), "mysql-bin.000007"));
}

#[test]
fn test_purge_rejects_injected_name_without_connecting() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    let server = host.server(dirs.config());

    assert!(!server.purge_binlog(&target(), "mysql-bin.000007'; DROP DATABASE x; --"));
    assert!(host.sql.connections().is_empty());
}
