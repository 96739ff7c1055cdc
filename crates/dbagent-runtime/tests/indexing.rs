use dbagent_runtime::{BinlogIndexer, Error, Indexer, JobPriority, JobSpec, StepRecorder};
use dbagent_testing::HostDirs;
use dbagent_testing::fakes::{FakeHost, FakeShell, IndexCall, RecordingIndexer};
use dbagent_types::QueryType;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_add_indexes_in_order() {
    let dirs = HostDirs::new().unwrap();
    dirs.binlog_index(&["mysql-bin.000003"]).unwrap();
    let host = FakeHost::new();
    let server = host.server(dirs.config());

    let report = server.add_binlogs_to_index(&names(&["mysql-bin.000001", "mysql-bin.000002"]));

    assert_eq!(report.indexed_binlogs, names(&["mysql-bin.000001", "mysql-bin.000002"]));
    assert_eq!(report.message, "");
    assert_eq!(report.current_binlog.as_deref(), Some("mysql-bin.000003"));
    assert_eq!(
        host.indexer.calls(),
        vec![
            IndexCall::Add("mysql-bin.000001".to_string()),
            IndexCall::Add("mysql-bin.000002".to_string()),
        ]
    );
    assert_eq!(host.cpu.samples(), vec![Duration::from_secs(0)]);
}

#[test]
fn test_add_skipped_when_cpu_busy() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    host.cpu.set(50.5);
    let server = host.server(dirs.config());

    let report = server.add_binlogs_to_index(&names(&["mysql-bin.000001"]));

    assert!(report.indexed_binlogs.is_empty());
    assert_eq!(report.message, "CPU usage > 50%. Skipped indexing");
    assert!(host.indexer.calls().is_empty());
}

#[test]
fn test_threshold_itself_is_not_busy() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    host.cpu.set(50.0);
    let server = host.server(dirs.config());

    let report = server.add_binlogs_to_index(&names(&["mysql-bin.000001"]));
    assert_eq!(report.indexed_binlogs.len(), 1);
}

#[test]
fn test_remove_skipped_when_cpu_busy() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::with_indexer(RecordingIndexer::with_indexed(&["mysql-bin.000001"]));
    host.cpu.set(93.0);
    let server = host.server(dirs.config());

    let report = server.remove_binlogs_from_index(&names(&["mysql-bin.000001"]));

    assert!(report.unindexed_binlogs.is_empty());
    assert_eq!(report.message, "CPU usage > 50%. Not safe to unindex binlogs");
    assert!(host.indexer.calls().is_empty());
    assert_eq!(host.indexer.indexed_binlogs().unwrap(), names(&["mysql-bin.000001"]));
}

#[test]
fn test_cpu_sample_failure_skips_work() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    host.cpu.break_sampling();
    let server = host.server(dirs.config());

    let report = server.add_binlogs_to_index(&names(&["mysql-bin.000001"]));
    assert!(report.indexed_binlogs.is_empty());
    assert!(report.message.ends_with("Skipped indexing"));
    assert!(host.indexer.calls().is_empty());
}

#[test]
fn test_add_stops_at_first_failure() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    host.indexer.fail_on("mysql-bin.000002");
    let server = host.server(dirs.config());

    let report = server.add_binlogs_to_index(&names(&[
        "mysql-bin.000001",
        "mysql-bin.000002",
        "mysql-bin.000003",
    ]));

    assert_eq!(report.indexed_binlogs, names(&["mysql-bin.000001"]));
    assert!(
        report
            .message
            .starts_with("Failed to index binlog mysql-bin.000002: ")
    );
    // 000003 is never attempted
    assert_eq!(host.indexer.calls().len(), 2);
}

#[test]
fn test_remove_stops_at_invalid_name() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::with_indexer(RecordingIndexer::with_indexed(&[
        "mysql-bin.000001",
        "mysql-bin.000002",
    ]));
    let server = host.server(dirs.config());

    let report = server.remove_binlogs_from_index(&names(&[
        "mysql-bin.000001",
        "../queries.db",
        "mysql-bin.000002",
    ]));

    assert_eq!(report.unindexed_binlogs, names(&["mysql-bin.000001"]));
    assert!(report.message.starts_with("Failed to unindex binlog ../queries.db: "));
    assert_eq!(host.indexer.indexed_binlogs().unwrap(), names(&["mysql-bin.000002"]));
}

#[test]
fn test_lookups_validate_query_type() {
    let dirs = HostDirs::new().unwrap();
    let server = FakeHost::new().server(dirs.config());

    let timeline = server.get_timeline(0, 3600, Some("site_db"), Some("UPDATE")).unwrap();
    assert_eq!(timeline.interval, 60);

    let err = server
        .get_row_ids(0, 3600, "truncate", "site_db", None, None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

const SHORT_FORM: &str = "\
/*!40019 SET @@session.max_insert_delayed_threads=0*/;
DELIMITER /*!*/;
# at 256
use `site_db`/*!*/;
SET TIMESTAMP=1704067200/*!*/;
BEGIN
/*!*/;
UPDATE `tabUser` SET `enabled`=0 WHERE `name`='guest'
/*!*/;
COMMIT/*!*/;
SET TIMESTAMP=1704067230/*!*/;
BEGIN
/*!*/;
INSERT INTO `tabNote` (`name`, `title`) VALUES ('n-1', 'Maintenance')
/*!*/;
COMMIT/*!*/;
DELIMITER ;
";

#[test]
fn test_binlog_indexer_add_query_remove() {
    let dirs = HostDirs::new().unwrap();
    let binlog = dirs.binlog("mysql-bin.000004", b"").unwrap();
    let config = dirs.config();

    let shell = Arc::new(FakeShell::new());
    shell.set_stdout(SHORT_FORM);
    let indexer = BinlogIndexer::new(shell.clone(), "mariadb-binlog", config.index_path());

    indexer.add(&binlog).unwrap();
    // Re-adding replaces rather than duplicates
    indexer.add(&binlog).unwrap();

    assert!(config.index_path().exists());
    assert_eq!(shell.calls()[0].args[0], "--short-form");
    assert_eq!(indexer.indexed_binlogs().unwrap(), names(&["mysql-bin.000004"]));

    let groups = indexer
        .row_ids(1704067200, 1704070800, QueryType::Update, "site_db", Some("tabUser"), None)
        .unwrap();
    assert_eq!(groups["mysql-bin.000004"].len(), 1);

    let rows = indexer.queries(&groups, "site_db").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].table.as_deref(), Some("tabUser"));
    assert_eq!(rows[0].timestamp, 1704067200);

    let timeline = indexer
        .timeline(1704067200, 1704070800, None, None)
        .unwrap();
    let totals: u64 = timeline.results.iter().map(|b| b.total()).sum();
    assert_eq!(totals, 2);
    assert_eq!(timeline.tables, names(&["tabNote", "tabUser"]));

    indexer.remove(&binlog).unwrap();
    assert!(indexer.indexed_binlogs().unwrap().is_empty());
}

#[test]
fn test_binlog_indexer_tool_failure_leaves_index_untouched() {
    let dirs = HostDirs::new().unwrap();
    let binlog = dirs.binlog("mysql-bin.000004", b"").unwrap();
    let config = dirs.config();

    let shell = Arc::new(FakeShell::new());
    shell.fail_on("mysql-bin.000004");
    let indexer = BinlogIndexer::new(shell, "mariadb-binlog", config.index_path());

    assert!(indexer.add(&binlog).is_err());
    assert!(indexer.indexed_binlogs().unwrap().is_empty());
}

#[derive(Default)]
struct JobLog {
    entries: Mutex<Vec<(JobSpec, String, Value, Value)>>,
}

impl StepRecorder for JobLog {
    fn record(&self, job: &JobSpec, step: &str, input: &Value, output: &Value) {
        self.entries
            .lock()
            .unwrap()
            .push((*job, step.to_string(), input.clone(), output.clone()));
    }
}

#[test]
fn test_index_jobs_record_their_spec() {
    let dirs = HostDirs::new().unwrap();
    let host = FakeHost::new();
    let server = host.server(dirs.config());
    let log = JobLog::default();

    server.add_binlogs_to_index_job(&log, &names(&["mysql-bin.000001"]));
    server.remove_binlogs_from_index_job(&log, &names(&["mysql-bin.000001"]));

    let entries = log.entries.lock().unwrap();
    assert_eq!(entries.len(), 2);

    let (job, step, input, output) = &entries[0];
    assert_eq!(job.name, "Add Binlogs To Indexer");
    assert_eq!(job.priority, JobPriority::Low);
    assert_eq!(step, "Add Binlogs To Indexer");
    assert_eq!(input, &json!({ "binlogs": ["mysql-bin.000001"] }));
    assert_eq!(output["indexed_binlogs"], json!(["mysql-bin.000001"]));

    let (job, _, _, output) = &entries[1];
    assert_eq!(job.name, "Remove Binlogs From Indexer");
    assert_eq!(output["unindexed_binlogs"], json!(["mysql-bin.000001"]));
}
