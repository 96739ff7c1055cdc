use anyhow::Result;
use dbagent_testing::TestWorld;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_index_timeline_on_empty_index() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["index", "timeline", "--start", "0", "--end", "600"])?;
    assert!(result.success(), "stderr: {}", result.stderr);

    let json = result.json()?;
    assert_eq!(json["interval"], json!(10));
    assert_eq!(json["results"], json!([]));
    assert_eq!(json["databases"], json!([]));
    assert!(world.dirs().agent_dir().join("binlog-indexes").is_dir());
    Ok(())
}

#[test]
fn test_index_lookup_rejects_unknown_type() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&[
        "index", "row-ids", "--start", "0", "--end", "600", "--type", "truncate", "--database",
        "site_db",
    ])?;
    assert!(!result.success());
    assert!(predicate::str::contains("unknown query type").eval(&result.stderr));
    Ok(())
}

#[test]
fn test_index_queries_rejects_malformed_row_ids() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["index", "queries", "--database", "site_db", "--row-ids", "[1,2]"])?;
    assert!(!result.success());
    assert!(result.stderr.contains("--row-ids"), "stderr: {}", result.stderr);
    Ok(())
}

#[test]
fn test_archive_requires_readable_offsite_config() -> Result<()> {
    let world = TestWorld::new().with_binlog("mysql-bin.000001", b"data");
    let missing = world.dirs().root().join("offsite.json");

    let result = world.run(&[
        "archive",
        "mysql-bin.000001",
        "--offsite",
        missing.to_str().unwrap(),
    ])?;
    assert!(!result.success());
    assert!(result.stderr.contains("Failed to read"), "stderr: {}", result.stderr);
    Ok(())
}

#[test]
fn test_stalks_list_and_show() -> Result<()> {
    let world = TestWorld::new()
        .with_stalk_file("2024_01_01_00_00_00-output-disk", b"/dev/sda1 90%")
        .with_stalk_file("2024_01_01_00_00_00-output-mysqladmin", b"Uptime: 10")
        .with_stalk_file("2024_02_01_12_30_00-output-disk", b"/dev/sda1 40%");

    let result = world.run(&["stalks", "list"])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(
        result.json()?,
        json!([
            {"name": "2024_01_01_00_00_00", "timestamp": "2024-01-01T00:00:00+00:00"},
            {"name": "2024_02_01_12_30_00", "timestamp": "2024-02-01T12:30:00+00:00"},
        ])
    );

    let result = world.run(&["stalks", "show", "2024_01_01_00_00_00"])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(
        result.json()?,
        json!([
            {"type": "output-disk", "text": "/dev/sda1 90%"},
            {"type": "output-mysqladmin", "text": "Uptime: 10"},
        ])
    );
    Ok(())
}

#[test]
fn test_stalks_show_rejects_bad_name() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["stalks", "show", "../mysql"])?;
    assert!(!result.success());
    assert!(result.stderr.starts_with("Error: "), "stderr: {}", result.stderr);
    Ok(())
}
