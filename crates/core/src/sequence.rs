//! Numbering rules for vouchers and journal entries.
//!
//! Counters live in locked database rows; this module only formats and
//! parses the numbers they produce.

use thiserror::Error;

use ledgersync_shared::AppError;

/// Prefix of every journal entry number.
pub const JOURNAL_PREFIX: &str = "JE";

/// Errors raised while drawing a number.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The counter row does not exist.
    #[error("Sequence counter not found: {0}")]
    CounterNotFound(String),

    /// The counter would overflow its column.
    #[error("Sequence counter exhausted: {0}")]
    Exhausted(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl SequenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::CounterNotFound(_) => "SEQUENCE_NOT_FOUND",
            Self::Exhausted(_) => "SEQUENCE_EXHAUSTED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::CounterNotFound(_) => 404,
            Self::Exhausted(_) | Self::Database(_) => 500,
        }
    }
}

impl From<SequenceError> for AppError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::CounterNotFound(_) => Self::NotFound(err.to_string()),
            SequenceError::Exhausted(_) => Self::Internal(err.to_string()),
            SequenceError::Database(msg) => Self::Database(msg),
        }
    }
}

/// Formats a voucher number as `{type_code}-{consecutive:06}`.
#[must_use]
pub fn format_voucher_number(type_code: &str, consecutive: i64) -> String {
    format!("{type_code}-{consecutive:06}")
}

/// Formats a journal entry number as `JE-{year}-{seq:05}`.
#[must_use]
pub fn format_entry_number(year: i32, sequence: i64) -> String {
    format!("{JOURNAL_PREFIX}-{year}-{sequence:05}")
}

/// `LIKE` pattern matching every entry number of a year.
#[must_use]
pub fn entry_number_pattern(year: i32) -> String {
    format!("{JOURNAL_PREFIX}-{year}-%")
}

/// Extracts the sequence part of an entry number for the given year.
///
/// Returns `None` for numbers of other years or with a non-numeric tail.
#[must_use]
pub fn parse_entry_sequence(entry_number: &str, year: i32) -> Option<i64> {
    let prefix = format!("{JOURNAL_PREFIX}-{year}-");
    let tail = entry_number.strip_prefix(&prefix)?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Highest sequence among existing entry numbers of a year, or zero.
pub fn max_entry_sequence<'a, I>(entry_numbers: I, year: i32) -> i64
where
    I: IntoIterator<Item = &'a str>,
{
    entry_numbers
        .into_iter()
        .filter_map(|n| parse_entry_sequence(n, year))
        .max()
        .unwrap_or(0)
}

/// Next value after `current`.
///
/// # Errors
///
/// Returns `SequenceError::Exhausted` on overflow.
pub fn next_value(current: i64, counter: &str) -> Result<i64, SequenceError> {
    current
        .checked_add(1)
        .ok_or_else(|| SequenceError::Exhausted(counter.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_voucher_number_format() {
        assert_eq!(format_voucher_number("CE", 1), "CE-000001");
        assert_eq!(format_voucher_number("RC", 123_456), "RC-123456");
        assert_eq!(format_voucher_number("RC", 1_234_567), "RC-1234567");
    }

    #[test]
    fn test_entry_number_format() {
        assert_eq!(format_entry_number(2026, 1), "JE-2026-00001");
        assert_eq!(format_entry_number(2026, 42), "JE-2026-00042");
        assert_eq!(entry_number_pattern(2026), "JE-2026-%");
    }

    #[rstest]
    #[case("JE-2026-00007", Some(7))]
    #[case("JE-2026-123456", Some(123_456))]
    #[case("JE-2025-00007", None)]
    #[case("JE-2026-", None)]
    #[case("JE-2026-00a1", None)]
    #[case("JE-2026--1", None)]
    fn test_parse_entry_sequence(#[case] number: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_entry_sequence(number, 2026), expected);
    }

    #[test]
    fn test_max_entry_sequence() {
        let numbers = ["JE-2026-00003", "JE-2026-00011", "JE-2025-00099", "junk"];
        assert_eq!(max_entry_sequence(numbers, 2026), 11);
        assert_eq!(max_entry_sequence(numbers, 2024), 0);
    }

    #[test]
    fn test_next_value() {
        assert_eq!(next_value(0, "CE").unwrap(), 1);
        assert!(matches!(
            next_value(i64::MAX, "CE"),
            Err(SequenceError::Exhausted(_))
        ));
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = SequenceError::CounterNotFound("voucher type".into()).into();
        assert_eq!(app.status_code(), 404);
    }
}
