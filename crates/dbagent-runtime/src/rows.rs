use dbagent_types::Row;
use serde_json::Value;

// The text protocol hands numbers back as strings; prepared statements hand
// back numbers. Accept both.

pub fn row_i64(row: &Row, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn row_str<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_row_i64_accepts_text_and_numbers() {
        let r = row(json!({"Id": "42", "Time": 7, "Info": null, "State": "x"}));
        assert_eq!(row_i64(&r, "Id"), Some(42));
        assert_eq!(row_i64(&r, "Time"), Some(7));
        assert_eq!(row_i64(&r, "Info"), None);
        assert_eq!(row_i64(&r, "State"), None);
        assert_eq!(row_i64(&r, "Missing"), None);
    }

    #[test]
    fn test_row_str() {
        let r = row(json!({"User": "system user", "Time": 1}));
        assert_eq!(row_str(&r, "User"), Some("system user"));
        assert_eq!(row_str(&r, "Time"), None);
    }
}
