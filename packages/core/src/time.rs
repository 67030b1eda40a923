//! Source timestamp parsing.

use crate::error::DecodeError;
use chrono::NaiveDateTime;

const WHOLE_SECONDS: &str = "%Y-%m-%dT%H:%M:%SZ";
const FRACTIONAL_SECONDS: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// Whole-second timestamps are exactly 20 characters; anything longer
// than 21 carries a fractional component.
const FRACTIONAL_LENGTH: usize = 21;

/// Parse a UTC source timestamp into epoch milliseconds.
pub fn parse_source_timestamp(raw: &str) -> Result<i64, DecodeError> {
    let format = if raw.len() > FRACTIONAL_LENGTH {
        FRACTIONAL_SECONDS
    } else {
        WHOLE_SECONDS
    };

    NaiveDateTime::parse_from_str(raw, format)
        .map(|dt| dt.and_utc().timestamp_millis())
        .map_err(|_| DecodeError::MalformedTimestamp(raw.to_string()))
}
