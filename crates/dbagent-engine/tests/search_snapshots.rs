use dbagent_engine::{compile_pattern, parse_statements, search_events};
use dbagent_types::QueryType;
use std::fs;
use std::path::Path;

fn load_fixture(name: &str) -> String {
    let path = Path::new("tests/fixtures").join(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", path.display()))
}

#[test]
fn test_single_update_in_window() {
    let output = "SET TIMESTAMP=1704067200/*!*/;\nUPDATE t SET x=1\n/*!*/;\n";
    let pattern = compile_pattern("UPDATE").unwrap();

    let events = search_events(output, &pattern, 100).unwrap();

    insta::assert_json_snapshot!(events, @r###"
    [
      {
        "query": "UPDATE t SET x=1",
        "timestamp": "2024-01-01 00:00:00"
      }
    ]
    "###);
}

#[test]
fn test_short_form_search_for_table() {
    let output = load_fixture("short_form.txt");
    let pattern = compile_pattern("tabUser").unwrap();

    let events = search_events(&output, &pattern, 100).unwrap();

    insta::assert_json_snapshot!(events, @r###"
    [
      {
        "query": "UPDATE `tabUser` SET `last_active`='2024-01-01 00:00:00' WHERE `name`='admin'",
        "timestamp": "2024-01-01 00:00:00"
      },
      {
        "query": "DELETE FROM `tabUser` WHERE `name`='guest-42'",
        "timestamp": "2024-01-01 01:00:00"
      }
    ]
    "###);
}

#[test]
fn test_short_form_search_ignores_session_noise() {
    let output = load_fixture("short_form.txt");
    let pattern = compile_pattern("(?i)session|transaction|commit").unwrap();

    let events = search_events(&output, &pattern, 100).unwrap();
    assert!(events.is_empty(), "noise leaked into results: {:?}", events);
}

#[test]
fn test_short_form_statements_for_index() {
    let output = load_fixture("short_form.txt");

    let statements = parse_statements(&output).unwrap();
    let summary: Vec<_> = statements
        .iter()
        .map(|s| {
            (
                s.database.as_deref(),
                s.table.as_deref(),
                s.kind,
                s.timestamp,
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            (Some("site_db"), Some("tabUser"), QueryType::Update, 1704067200),
            (Some("site_db"), Some("tabNote"), QueryType::Insert, 1704067230),
            (Some("site_db"), Some("tabUser"), QueryType::Delete, 1704070800),
        ]
    );
}
