use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use std::collections::BTreeMap;

use crate::Result;
use dbagent_types::{QueryType, Timeline, TimelineBucket};

// Target bucket count. The interval is the integer range / 60 (floor 1), so
// the remainder spills into extra buckets: a range of 119s has 120 one-second
// buckets, and the inclusive end of 0..3600 opens a 61st bucket at 3600.
const BUCKETS: i64 = 60;

pub fn timeline(
    conn: &Connection,
    start: i64,
    end: i64,
    database: Option<&str>,
    kind: Option<QueryType>,
) -> Result<Timeline> {
    let interval = bucket_interval(start, end);

    let mut filter = String::from("timestamp >= ? AND timestamp <= ?");
    let mut values = vec![Value::from(start), Value::from(end)];
    if let Some(database) = database {
        filter.push_str(" AND db_name = ?");
        values.push(Value::from(database.to_string()));
    }
    if let Some(kind) = kind {
        filter.push_str(" AND type = ?");
        values.push(Value::from(kind.as_str().to_string()));
    }

    let sql = format!(
        "SELECT (timestamp - {start}) / {interval} AS bucket, type, COUNT(*) FROM query \
         WHERE {filter} GROUP BY bucket, type ORDER BY bucket",
    );
    let mut stmt = conn.prepare(&sql)?;
    let counts = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut buckets: BTreeMap<i64, TimelineBucket> = BTreeMap::new();
    for (bucket, kind, count) in counts {
        let timestamp = start + bucket * interval;
        buckets
            .entry(timestamp)
            .or_insert_with(|| TimelineBucket::new(timestamp))
            .add(
                QueryType::parse(&kind).unwrap_or(QueryType::Other),
                count as u64,
            );
    }

    Ok(Timeline {
        start_timestamp: start,
        end_timestamp: end,
        interval,
        databases: distinct(conn, "db_name", &filter, &values)?,
        tables: distinct(conn, "table_name", &filter, &values)?,
        results: buckets.into_values().collect(),
    })
}

fn bucket_interval(start: i64, end: i64) -> i64 {
    ((end - start) / BUCKETS).max(1)
}

fn distinct(conn: &Connection, column: &str, filter: &str, values: &[Value]) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT DISTINCT {column} FROM query WHERE {filter} AND {column} IS NOT NULL ORDER BY {column}",
    );
    let mut stmt = conn.prepare(&sql)?;
    let names = stmt
        .query_map(params_from_iter(values.iter()), |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}
