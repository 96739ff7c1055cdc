use crate::blocks::{Block, TimestampState, blocks, filter_lines};
use crate::{Result, format_timestamp};
use dbagent_types::LogEvent;
use regex::Regex;
use std::sync::LazyLock;

/// Transaction/session boilerplate and comments emitted around every event
static NOISE_LINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(USE|COMMIT|START TRANSACTION|DELIMITER|ROLLBACK|#)").unwrap()
});

/// Remove tool noise lines from raw extraction output
pub fn strip_noise(output: &str) -> String {
    filter_lines(output, &NOISE_LINES)
}

/// Compile a caller-supplied search pattern
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

/// Collect statements matching `pattern` from raw extraction output.
///
/// Statements seen before the first `SET TIMESTAMP` marker are dropped even
/// when they match. Collection stops once the result holds more than
/// `max_lines` events, so up to `max_lines + 1` are returned.
pub fn search_events(output: &str, pattern: &Regex, max_lines: usize) -> Result<Vec<LogEvent>> {
    let text = strip_noise(output);
    let mut state = TimestampState::NoTimestamp;
    let mut events = Vec::new();

    for block in blocks(&text) {
        match block? {
            Block::Timestamp(ts) => state = TimestampState::from_marker(ts),
            Block::Preamble => continue,
            Block::Statement(query) => {
                let Some(ts) = state.current() else {
                    continue;
                };
                if !pattern.is_match(query) {
                    continue;
                }
                events.push(LogEvent {
                    query: query.to_string(),
                    timestamp: format_timestamp(ts),
                });
                if events.len() > max_lines {
                    break;
                }
            }
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> Regex {
        compile_pattern(p).unwrap()
    }

    #[test]
    fn test_strip_noise_is_case_insensitive() {
        let raw = "use `site`/*!*/;\nCOMMIT/*!*/;\nstart transaction\n# at 256\nUPDATE t SET x=1\n";
        assert_eq!(strip_noise(raw), "UPDATE t SET x=1\n");
    }

    #[test]
    fn test_statements_before_first_marker_are_dropped() {
        let raw = "UPDATE early SET x=1\n/*!*/;\n\
                   SET TIMESTAMP=1704067200/*!*/;\n\
                   UPDATE late SET x=2\n/*!*/;\n";
        let events = search_events(raw, &pattern("UPDATE"), 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "UPDATE late SET x=2");
    }

    #[test]
    fn test_zero_epoch_marker_establishes_nothing() {
        let raw = "SET TIMESTAMP=0/*!*/;\n\
                   UPDATE t SET x=1\n/*!*/;\n";
        assert!(search_events(raw, &pattern("UPDATE"), 10).unwrap().is_empty());

        let raw = "SET TIMESTAMP=1704067200/*!*/;\n\
                   UPDATE a SET x=1\n/*!*/;\n\
                   SET TIMESTAMP=0/*!*/;\n\
                   UPDATE b SET x=1\n/*!*/;\n";
        let events = search_events(raw, &pattern("UPDATE"), 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "UPDATE a SET x=1");
    }

    #[test]
    fn test_marker_carries_until_next_marker() {
        let raw = "SET TIMESTAMP=1704067200/*!*/;\n\
                   UPDATE a SET x=1\n/*!*/;\n\
                   UPDATE b SET x=1\n/*!*/;\n\
                   SET TIMESTAMP=1704067260.5/*!*/;\n\
                   UPDATE c SET x=1\n/*!*/;\n";
        let events = search_events(raw, &pattern("UPDATE"), 10).unwrap();
        let stamps: Vec<_> = events.iter().map(|e| e.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec!["2024-01-01 00:00:00", "2024-01-01 00:00:00", "2024-01-01 00:01:00"]
        );
    }

    #[test]
    fn test_session_set_blocks_never_match() {
        let raw = "SET TIMESTAMP=1704067200/*!*/;\n\
                   SET @@session.sql_mode=1411383296/*!*/;\n\
                   /*!\\C utf8mb4 *//*!*/;\n";
        let events = search_events(raw, &pattern(".*"), 10).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_pattern_filters_statements() {
        let raw = "SET TIMESTAMP=1704067200/*!*/;\n\
                   INSERT INTO t VALUES (1)\n/*!*/;\n\
                   DELETE FROM t WHERE id=1\n/*!*/;\n";
        let events = search_events(raw, &pattern("^DELETE"), 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query, "DELETE FROM t WHERE id=1");
    }

    #[test]
    fn test_cap_is_max_lines_plus_one() {
        let mut raw = String::from("SET TIMESTAMP=1704067200/*!*/;\n");
        for i in 0..10 {
            raw.push_str(&format!("UPDATE t SET x={}\n/*!*/;\n", i));
        }
        let events = search_events(&raw, &pattern("UPDATE"), 3).unwrap();
        assert_eq!(events.len(), 4);

        let events = search_events(&raw, &pattern("UPDATE"), 0).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_invalid_marker_fails_the_search() {
        let raw = "SET TIMESTAMP=abc/*!*/;\nUPDATE t SET x=1\n/*!*/;\n";
        assert!(search_events(raw, &pattern("UPDATE"), 10).is_err());
    }

    #[test]
    fn test_compile_pattern_reports_bad_regex() {
        assert!(compile_pattern("(unclosed").is_err());
    }
}
