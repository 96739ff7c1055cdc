use anyhow::Result;
use dbagent_testing::TestWorld;
use serde_json::json;

fn world_with_binlogs() -> TestWorld {
    TestWorld::new()
        .with_binlog("mysql-bin.000002", b"second")
        .with_binlog("mysql-bin.000001", b"first!")
        .with_binlog("mysql-bin.000001.gz", b"stale")
        .with_binlog_index(&["mysql-bin.000001", "mysql-bin.000002"])
}

#[test]
fn test_binlogs_list_prints_files_in_order() -> Result<()> {
    let world = world_with_binlogs();

    let result = world.run(&["binlogs", "list"])?;
    assert!(result.success(), "stderr: {}", result.stderr);

    let json = result.json()?;
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], json!("mysql-bin.000001"));
    assert_eq!(files[0]["size"], json!(6));
    assert_eq!(files[1]["name"], json!("mysql-bin.000002"));
    Ok(())
}

#[test]
fn test_binlogs_current_reads_index_file() -> Result<()> {
    let world = world_with_binlogs();

    let result = world.run(&["binlogs", "current"])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(result.json()?, json!("mysql-bin.000002"));
    Ok(())
}

#[test]
fn test_binlogs_current_without_index_is_null() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["binlogs", "current"])?;
    assert!(result.success());
    assert_eq!(result.json()?, json!(null));
    Ok(())
}

#[test]
fn test_binlogs_snapshot_with_empty_query_index() -> Result<()> {
    let world = world_with_binlogs();

    let result = world.run(&["binlogs", "snapshot"])?;
    assert!(result.success(), "stderr: {}", result.stderr);

    let json = result.json()?;
    assert_eq!(json["binlogs_in_disk"].as_array().unwrap().len(), 2);
    assert_eq!(json["indexed_binlogs"], json!([]));
    assert_eq!(json["current_binlog"], json!("mysql-bin.000002"));
    Ok(())
}

#[test]
fn test_search_rejects_non_binlog_name() -> Result<()> {
    let world = world_with_binlogs();

    let result = world.run(&[
        "search",
        "../../etc/passwd",
        "--database",
        "site_db",
        "--start",
        "2024-01-01 00:00:00",
        "--stop",
        "2024-01-01 01:00:00",
        "--pattern",
        "UPDATE",
    ])?;

    assert!(!result.success());
    assert!(result.stderr.contains("Error: Invalid input"), "stderr: {}", result.stderr);
    assert!(result.stdout.is_empty());
    Ok(())
}

#[test]
fn test_purge_of_invalid_name_prints_false() -> Result<()> {
    let world = world_with_binlogs().with_env("DBAGENT_MARIADB_ROOT_PASSWORD", "secret");

    let result = world.run(&["purge", "mysql-bin.000001; DROP DATABASE x"])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(result.json()?, json!(false));
    Ok(())
}

#[test]
fn test_commands_needing_a_server_require_password() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&["processes"])?;
    assert!(!result.success());
    assert!(result.stderr.contains("--password"), "stderr: {}", result.stderr);
    Ok(())
}

#[test]
fn test_explain_refusal_needs_no_connection() -> Result<()> {
    let world = TestWorld::new();

    let result = world.run(&[
        "explain",
        "--database",
        "site_db",
        "--host",
        "db.invalid",
        "--password",
        "secret",
        "DROP TABLE tabUser",
    ])?;
    assert!(result.success(), "stderr: {}", result.stderr);
    assert_eq!(result.json()?, json!([]));
    Ok(())
}
