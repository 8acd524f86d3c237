//! # Validation
//!
//! Format checks on declared state. These run before any remote call so a bad
//! document fails fast with a validation error instead of a remote round-trip.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static NAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z_.-]+$").expect("name character class regex is valid")
});

/// In-application stream and column names
static SQL_IDENTIFIER_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^-\s<>&]+$").expect("SQL identifier regex is valid")
});

static MAINTENANCE_START_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("maintenance window regex is valid")
});

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::validation(format!(
            "{field}: expected length of {value:?} to be in the range ({min} - {max}), got {len}"
        )));
    }
    Ok(())
}

fn check_name_chars(field: &str, value: &str) -> Result<()> {
    if NAME_CHARS.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{field}: {value:?} must only include alphanumeric, underscore, period, or hyphen characters"
        )))
    }
}

/// Application name: 1-128 of `[0-9A-Za-z_.-]`
///
/// # Errors
///
/// Returns a validation error describing the violated rule.
pub fn validate_application_name(name: &str) -> Result<()> {
    check_length("name", name, 1, 128)?;
    check_name_chars("name", name)
}

/// Snapshot name: 1-256 of `[0-9A-Za-z_.-]`
///
/// # Errors
///
/// Returns a validation error describing the violated rule.
pub fn validate_snapshot_name(name: &str) -> Result<()> {
    check_length("snapshot_name", name, 1, 256)?;
    check_name_chars("snapshot_name", name)
}

/// Description: at most 1024 characters
///
/// # Errors
///
/// Returns a validation error when the description is too long.
pub fn validate_description(description: &str) -> Result<()> {
    check_length("description", description, 0, 1024)
}

/// Property group id: 1-50 of `[0-9A-Za-z_.-]`
///
/// # Errors
///
/// Returns a validation error describing the violated rule.
pub fn validate_property_group_id(id: &str) -> Result<()> {
    check_length("property_group_id", id, 1, 50)?;
    check_name_chars("property_group_id", id)
}

/// In-application identifiers: no hyphen, whitespace, angle bracket or ampersand
///
/// # Errors
///
/// Returns a validation error describing the violated rule.
pub fn validate_sql_identifier(field: &str, value: &str, max: usize) -> Result<()> {
    check_length(field, value, 1, max)?;
    if SQL_IDENTIFIER_CHARS.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "{field}: {value:?} must not include hyphen, whitespace, angle bracket, or ampersand characters"
        )))
    }
}

/// Maintenance window start time in 24-hour `HH:MM`
///
/// # Errors
///
/// Returns a validation error when the value is not a valid time of day.
pub fn validate_maintenance_start_time(value: &str) -> Result<()> {
    if MAINTENANCE_START_TIME.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "application_maintenance_window_start_time: {value:?} must be in the format HH:MM"
        )))
    }
}

/// Generic bounded string (ARNs, keys, SQL types)
///
/// # Errors
///
/// Returns a validation error when the length is out of range.
pub fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    check_length(field, value, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_name() {
        assert!(validate_application_name("my_app.v1-blue").is_ok());
        assert!(validate_application_name(&"a".repeat(128)).is_ok());
        assert!(validate_application_name("").is_err());
        assert!(validate_application_name(&"a".repeat(129)).is_err());
        assert!(validate_application_name("my app").is_err());
        assert!(validate_application_name("app/1").is_err());
    }

    #[test]
    fn test_snapshot_name() {
        assert!(validate_snapshot_name(&"s".repeat(256)).is_ok());
        assert!(validate_snapshot_name(&"s".repeat(257)).is_err());
        assert!(validate_snapshot_name("snap:1").is_err());
    }

    #[test]
    fn test_sql_identifier() {
        assert!(validate_sql_identifier("name", "OUTPUT_STREAM", 32).is_ok());
        assert!(validate_sql_identifier("name", "OUTPUT-STREAM", 32).is_err());
        assert!(validate_sql_identifier("name", "a b", 32).is_err());
        assert!(validate_sql_identifier("name", "a&b", 32).is_err());
        assert!(validate_sql_identifier("name", &"x".repeat(33), 32).is_err());
    }

    #[test]
    fn test_maintenance_start_time() {
        for ok in ["00:00", "06:30", "23:59", "19:05"] {
            assert!(validate_maintenance_start_time(ok).is_ok(), "{ok}");
        }
        for bad in ["24:00", "6:30", "06:60", "0630", "", "06:30:00"] {
            assert!(validate_maintenance_start_time(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_property_group_id() {
        assert!(validate_property_group_id("ConsumerConfigProperties").is_ok());
        assert!(validate_property_group_id(&"p".repeat(51)).is_err());
    }
}
