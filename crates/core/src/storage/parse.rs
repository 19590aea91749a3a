//! Database value parsing utilities
//!
//! Provides error-safe parsing of stored values and translation of
//! constraint failures.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Error as SqlError;

use crate::error::Error;
use crate::models::{Action, Role};

fn conversion_failure(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> SqlError {
    SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Format a DateTime for storage.
///
/// Always nanosecond precision with a `Z` suffix, so stored values have a
/// fixed width and compare in SQL in chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a DateTime from an RFC3339 string
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, SqlError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(0, e))
}

pub fn parse_role(s: &str) -> Result<Role, SqlError> {
    s.parse::<Role>().map_err(|e| conversion_failure(0, e))
}

pub fn parse_action(s: &str) -> Result<Action, SqlError> {
    s.parse::<Action>().map_err(|e| conversion_failure(0, e))
}

/// Whether a failed statement tripped a UNIQUE index
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Translate a unique-index failure into [`Error::Conflict`], passing anything else through.
pub fn conflict_on_unique(err: SqlError, message: impl FnOnce() -> String) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(message())
    } else {
        Error::Database(err)
    }
}

/// Extension trait for converting rusqlite Results to Option
pub trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, SqlError>;
}

impl<T> OptionalExt<T> for Result<T, SqlError> {
    fn optional(self) -> Result<Option<T>, SqlError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(SqlError::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_parse_datetime_roundtrip() {
        let now = Utc::now();
        let parsed = parse_datetime(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_formatted_datetimes_sort_chronologically() {
        let whole = DateTime::parse_from_rfc3339("2026-01-01T10:00:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = whole + chrono::Duration::milliseconds(500);
        let next = whole + chrono::Duration::seconds(1);

        let formatted: Vec<_> = [whole, later, next].iter().map(format_datetime).collect();
        assert!(formatted.iter().all(|s| s.len() == formatted[0].len()));
        assert!(formatted[0] < formatted[1] && formatted[1] < formatted[2]);
        assert_eq!(parse_datetime(&formatted[1]).unwrap(), later);
    }

    #[test]
    fn test_conflict_on_unique() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL UNIQUE)").unwrap();
        conn.execute("INSERT INTO t (name) VALUES ('a')", []).unwrap();

        let err = conn.execute("INSERT INTO t (name) VALUES ('a')", []).unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(matches!(
            conflict_on_unique(err, || "taken".into()),
            Error::Conflict(_)
        ));

        let err = conn.execute("INSERT INTO t (name) VALUES (NULL)", []).unwrap_err();
        assert!(!is_unique_violation(&err));
        assert!(matches!(
            conflict_on_unique(err, || "taken".into()),
            Error::Database(_)
        ));
    }

    #[test]
    fn test_optional() {
        let conn = Connection::open_in_memory().unwrap();
        let none: Option<i64> = conn
            .query_row("SELECT 1 WHERE 0", [], |row| row.get(0))
            .optional()
            .unwrap();
        assert!(none.is_none());
    }
}
