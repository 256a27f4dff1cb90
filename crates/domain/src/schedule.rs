//! Autostop TTL rules shared by template and workspace updates.
//!
//! A template `max_ttl` of zero means unconstrained and a `default_ttl` of
//! zero means no default autostop. A workspace TTL of `None` means no
//! automatic stop; a zero workspace TTL is normalised to `None`.

use std::time::Duration;

use templar_core::{AppError, AppResult};

/// Transport field carrying a workspace TTL.
pub const TTL_FIELD: &str = "ttl_ms";
/// Transport field carrying a template default TTL.
pub const DEFAULT_TTL_FIELD: &str = "default_ttl_ms";
/// Transport field carrying a template max TTL.
pub const MAX_TTL_FIELD: &str = "max_ttl_ms";

/// Smallest TTL a workspace may carry.
pub const WORKSPACE_TTL_MIN: Duration = Duration::from_secs(60);
/// Largest TTL a workspace may carry regardless of template policy.
pub const WORKSPACE_TTL_MAX: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// TTL requested when a workspace is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlRequest {
    /// Nothing supplied: copy the template default.
    Inherit,
    /// Explicitly no automatic stop.
    Disabled,
    /// Explicit TTL.
    Set(Duration),
}

impl From<Option<Duration>> for TtlRequest {
    fn from(value: Option<Duration>) -> Self {
        match value {
            Some(ttl) => Self::Set(ttl),
            None => Self::Disabled,
        }
    }
}

/// Result of planning a workspace TTL update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlUpdatePlan {
    /// Store this TTL.
    Apply(Option<Duration>),
    /// Accept the request without touching the stored TTL.
    KeepCurrent,
}

/// Normalises a zero TTL to unset.
#[must_use]
pub fn normalize_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|value| !value.is_zero())
}

/// Checks a requested workspace TTL against the template max TTL only.
pub fn validate_workspace_ttl(max_ttl: Duration, requested: Option<Duration>) -> AppResult<()> {
    if max_ttl.is_zero() {
        return Ok(());
    }

    match requested {
        Some(ttl) if ttl > max_ttl => Err(AppError::invalid_field(
            TTL_FIELD,
            "time until shutdown must be less than or equal to the template's maximum TTL",
        )),
        _ => Ok(()),
    }
}

/// Checks the absolute workspace TTL bounds.
pub fn check_workspace_ttl_bounds(ttl: Duration) -> AppResult<()> {
    if ttl < WORKSPACE_TTL_MIN {
        return Err(AppError::invalid_field(
            TTL_FIELD,
            "time until shutdown must be at least one minute",
        ));
    }

    if ttl > WORKSPACE_TTL_MAX {
        return Err(AppError::invalid_field(
            TTL_FIELD,
            "time until shutdown must be less than 7 days",
        ));
    }

    Ok(())
}

fn validate_explicit_ttl(max_ttl: Duration, ttl: Option<Duration>) -> AppResult<Option<Duration>> {
    let ttl = normalize_ttl(ttl);
    if let Some(value) = ttl {
        check_workspace_ttl_bounds(value)?;
    }
    validate_workspace_ttl(max_ttl, ttl)?;
    Ok(ttl)
}

/// Resolves the TTL stored on a newly created workspace.
pub fn resolve_creation_ttl(
    default_ttl: Duration,
    max_ttl: Duration,
    requested: TtlRequest,
) -> AppResult<Option<Duration>> {
    match requested {
        TtlRequest::Inherit => Ok(normalize_ttl(Some(default_ttl))),
        TtlRequest::Disabled => validate_explicit_ttl(max_ttl, None),
        TtlRequest::Set(ttl) => validate_explicit_ttl(max_ttl, Some(ttl)),
    }
}

/// Plans an update of an existing workspace TTL.
///
/// Disabling (unset or zero) always succeeds. Under a non-zero max TTL it
/// leaves the stored value in place and never derives a replacement.
pub fn plan_workspace_ttl_update(
    max_ttl: Duration,
    requested: Option<Duration>,
) -> AppResult<TtlUpdatePlan> {
    match normalize_ttl(requested) {
        None if !max_ttl.is_zero() => Ok(TtlUpdatePlan::KeepCurrent),
        None => Ok(TtlUpdatePlan::Apply(None)),
        Some(ttl) => validate_explicit_ttl(max_ttl, Some(ttl)).map(TtlUpdatePlan::Apply),
    }
}

/// Validates a template schedule pair.
pub fn validate_template_schedule(default_ttl: Duration, max_ttl: Duration) -> AppResult<()> {
    if default_ttl > WORKSPACE_TTL_MAX {
        return Err(AppError::invalid_field(
            DEFAULT_TTL_FIELD,
            "default TTL must be less than 7 days",
        ));
    }

    if !max_ttl.is_zero() && default_ttl > max_ttl {
        return Err(AppError::invalid_field(
            DEFAULT_TTL_FIELD,
            "default TTL must be less than or equal to the maximum TTL",
        ));
    }

    Ok(())
}

/// Returns the clamped TTL when a stored workspace TTL exceeds a new max TTL.
#[must_use]
pub fn clamp_to_max_ttl(current: Option<Duration>, max_ttl: Duration) -> Option<Duration> {
    match current {
        Some(ttl) if !max_ttl.is_zero() && ttl > max_ttl => Some(max_ttl),
        _ => None,
    }
}
