use crate::Result;
use dbagent_types::{DbTarget, Row};
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Params, Value as MyValue};
use serde_json::Value;

/// Positional statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Str(String),
    Int(i64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Str(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Str(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

/// A single open session against the server.
///
/// Dropping the value closes the connection.
pub trait SqlConnection {
    /// Run a text-protocol statement and collect its rows
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Run a prepared statement with `?` placeholders bound to `params`
    fn query_with(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>>;

    /// Run a statement that returns no rows
    fn execute(&mut self, sql: &str) -> Result<()>;
}

/// Opens short-lived administrative connections
pub trait SqlConnector: Send + Sync {
    fn connect(&self, target: &DbTarget, database: &str) -> Result<Box<dyn SqlConnection>>;
}

/// Connector for a live MariaDB server over TCP
#[derive(Debug, Default, Clone, Copy)]
pub struct MariadbConnector;

impl SqlConnector for MariadbConnector {
    fn connect(&self, target: &DbTarget, database: &str) -> Result<Box<dyn SqlConnection>> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(target.host.clone()))
            .tcp_port(target.port)
            .user(Some(target.user.clone()))
            .pass(Some(target.password.clone()))
            .db_name(Some(database.to_string()));

        let conn = Conn::new(opts)?;
        tracing::debug!(host = %target.host, database, "opened database connection");
        Ok(Box::new(MariadbConnection { conn }))
    }
}

struct MariadbConnection {
    conn: Conn,
}

impl SqlConnection for MariadbConnection {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let rows: Vec<mysql::Row> = self.conn.query(sql)?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    fn query_with(&mut self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        let params = Params::Positional(params.iter().map(param_to_value).collect());
        let rows: Vec<mysql::Row> = self.conn.exec(sql, params)?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn.query_drop(sql)?;
        Ok(())
    }
}

fn param_to_value(param: &SqlParam) -> MyValue {
    match param {
        SqlParam::Str(s) => MyValue::Bytes(s.as_bytes().to_vec()),
        SqlParam::Int(i) => MyValue::Int(*i),
    }
}

fn row_to_map(row: &mysql::Row) -> Row {
    let mut map = Row::new();
    for (index, column) in row.columns_ref().iter().enumerate() {
        let value = row.as_ref(index).map_or(Value::Null, convert_value);
        map.insert(column.name_str().into_owned(), value);
    }
    map
}

/// Convert a wire value into JSON; temporal values use MariaDB's text form
pub(crate) fn convert_value(value: &MyValue) -> Value {
    match value {
        MyValue::NULL => Value::Null,
        MyValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        MyValue::Int(i) => Value::from(*i),
        MyValue::UInt(u) => Value::from(*u),
        MyValue::Float(f) => Value::from(f64::from(*f)),
        MyValue::Double(d) => Value::from(*d),
        MyValue::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::String(text)
        }
        MyValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let sign = if *negative { "-" } else { "" };
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds);
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            Value::String(text)
        }
    }
}

/// Backtick-quote an identifier, doubling embedded backticks
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
