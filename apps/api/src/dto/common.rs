use std::time::Duration;

use serde::Serialize;
use templar_core::{AppError, AppResult};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Converts a transport millisecond value into a duration.
pub fn millis_to_duration(field: &str, value: i64) -> AppResult<Duration> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| AppError::invalid_field(field, "duration must not be negative"))
}

/// Converts an optional transport millisecond value into a duration.
pub fn optional_millis_to_duration(field: &str, value: Option<i64>) -> AppResult<Option<Duration>> {
    value.map(|value| millis_to_duration(field, value)).transpose()
}

pub(super) fn duration_to_millis(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}
