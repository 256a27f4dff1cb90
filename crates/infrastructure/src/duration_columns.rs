use std::time::Duration;

use templar_core::{AppError, AppResult};

/// Converts a duration to the millisecond `BIGINT` stored in TTL columns.
pub(crate) fn to_millis(value: Duration) -> AppResult<i64> {
    i64::try_from(value.as_millis())
        .map_err(|error| AppError::Validation(format!("duration is out of range: {error}")))
}

/// Converts a stored millisecond `BIGINT` back into a duration.
pub(crate) fn from_millis(value: i64) -> AppResult<Duration> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|error| AppError::Internal(format!("stored duration is negative: {error}")))
}
