//! Type-directed coercion of free-text input into database literals.
//!
//! Each `TypeTag` owns one coercion function; dispatch happens over the
//! closed enum so adding a type means adding a variant and its function,
//! never touching unrelated branches. Coercion is pure: the only output
//! is the literal string handed to the query executor.

use chrono::{Local, LocalResult, NaiveDateTime, TimeZone};

use crate::error::{Error, Result};
use crate::schema::TypeTag;

/// Exact input layout accepted for `DateTime64(3)` columns.
const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable spelling of the layout, used in diagnostics.
const DATETIME_LAYOUT_HUMAN: &str = "YYYY-MM-DD HH:MM:SS";

impl TypeTag {
    /// Coerce one free-text input into the literal form required by this
    /// type. `column` only feeds diagnostics. Input is trimmed first;
    /// empty input on a nullable type yields the `NULL` literal.
    pub fn coerce(&self, column: &str, raw: &str) -> Result<String> {
        let value = raw.trim();
        match self {
            TypeTag::DateTime64Milli => coerce_datetime(column, value),
            TypeTag::UInt32 => coerce_uint32(column, value),
            TypeTag::NullableUInt8 => coerce_nullable_uint8(column, value),
            TypeTag::NullableString => coerce_nullable_string(value),
            TypeTag::Str => Ok(quote(value)),
            TypeTag::Unknown => Ok(value.to_string()),
        }
    }
}

/// Parse the exact `YYYY-MM-DD HH:MM:SS` layout and render the instant as
/// seconds since epoch with a fixed `.000` millisecond suffix.
///
/// The stored instant always has zero sub-second precision: the layout
/// accepts no fractional seconds, so nothing is lost at this boundary.
/// Calendar interpretation is local time, matching the ingestion host.
fn coerce_datetime(column: &str, value: &str) -> Result<String> {
    let parsed = NaiveDateTime::parse_from_str(value, DATETIME_LAYOUT).map_err(|_| {
        Error::format(
            column,
            value,
            format!("datetime in format {}", DATETIME_LAYOUT_HUMAN),
        )
    })?;

    let instant = match Local.from_local_datetime(&parsed) {
        LocalResult::Single(dt) => dt,
        // DST fold: take the earlier of the two instants.
        LocalResult::Ambiguous(dt, _) => dt,
        // DST gap: the wall-clock time never existed.
        LocalResult::None => {
            return Err(Error::format(column, value, "a resolvable local time"))
        }
    };

    Ok(format!("{}.000", instant.timestamp()))
}

fn coerce_uint32(column: &str, value: &str) -> Result<String> {
    let parsed: u32 = value
        .parse()
        .map_err(|_| Error::format(column, value, TypeTag::UInt32.to_string()))?;
    Ok(parsed.to_string())
}

/// Empty input is NULL. Non-empty input parses as an unsigned integer and
/// narrows to 8 bits by modular reduction: 256 becomes 0, 300 becomes 44.
/// This truncation (rather than rejection) is long-standing behavior and
/// intentionally inconsistent with the strict UInt32 range check.
fn coerce_nullable_uint8(column: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok("NULL".to_string());
    }
    let parsed: u64 = value
        .parse()
        .map_err(|_| Error::format(column, value, TypeTag::NullableUInt8.to_string()))?;
    Ok((parsed as u8).to_string())
}

fn coerce_nullable_string(value: &str) -> Result<String> {
    if value.is_empty() {
        Ok("NULL".to_string())
    } else {
        Ok(quote(value))
    }
}

/// Wrap text in single-quote literal delimiters. Embedded quotes are not
/// escaped; callers must not submit text containing the delimiter.
fn quote(value: &str) -> String {
    format!("'{}'", value)
}
