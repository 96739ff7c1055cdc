use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::Result;
use crate::records::QueryRecord;
use dbagent_types::{IndexedQuery, QueryType, RowIdGroups};

// Stay well under SQLite's host parameter limit
const IN_CLAUSE_CHUNK: usize = 500;

pub fn insert(conn: &Connection, binlog: &str, record: &QueryRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO query (binlog, db_name, table_name, timestamp, type, query)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            binlog,
            &record.database,
            &record.table,
            record.timestamp,
            record.kind.as_str(),
            &record.query,
        ],
    )?;
    Ok(())
}

pub fn delete_binlog(conn: &Connection, binlog: &str) -> Result<usize> {
    let removed = conn.execute("DELETE FROM query WHERE binlog = ?1", params![binlog])?;
    Ok(removed)
}

pub fn indexed_binlogs(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT binlog FROM query ORDER BY binlog ASC")?;
    let binlogs = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(binlogs)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM query", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn row_ids(
    conn: &Connection,
    start: i64,
    end: i64,
    kind: QueryType,
    database: &str,
    table: Option<&str>,
    search: Option<&str>,
) -> Result<RowIdGroups> {
    let mut sql = String::from(
        "SELECT id, binlog FROM query \
         WHERE timestamp >= ? AND timestamp <= ? AND type = ? AND db_name = ?",
    );
    let mut values = vec![
        Value::from(start),
        Value::from(end),
        Value::from(kind.as_str().to_string()),
        Value::from(database.to_string()),
    ];

    if let Some(table) = table {
        sql.push_str(" AND table_name = ?");
        values.push(Value::from(table.to_string()));
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        sql.push_str(" AND query LIKE ? ESCAPE '\\'");
        values.push(Value::from(format!("%{}%", escape_like(search))));
    }
    sql.push_str(" ORDER BY binlog, timestamp, id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut groups = RowIdGroups::new();
    for (id, binlog) in rows {
        groups.entry(binlog).or_default().push(id);
    }
    Ok(groups)
}

pub fn queries(
    conn: &Connection,
    row_ids: &RowIdGroups,
    database: &str,
) -> Result<Vec<IndexedQuery>> {
    let mut results = Vec::new();

    for (binlog, ids) in row_ids {
        for chunk in ids.chunks(IN_CLAUSE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT id, binlog, db_name, table_name, timestamp, type, query FROM query \
                 WHERE binlog = ? AND db_name = ? AND id IN ({})",
                placeholders
            );

            let mut values = vec![
                Value::from(binlog.clone()),
                Value::from(database.to_string()),
            ];
            values.extend(chunk.iter().map(|id| Value::from(*id)));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), |row| {
                    let kind: String = row.get(5)?;
                    Ok(IndexedQuery {
                        id: row.get(0)?,
                        binlog: row.get(1)?,
                        database: row.get(2)?,
                        table: row.get(3)?,
                        timestamp: row.get(4)?,
                        kind: QueryType::parse(&kind).unwrap_or(QueryType::Other),
                        query: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            results.extend(rows);
        }
    }

    results.sort_by_key(|row| (row.timestamp, row.id));
    Ok(results)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
