use crate::error::ServiceError;
use serde::Serialize;

/// Lowest credit load a student should carry in a semester
pub const MIN_CREDITS: i64 = 14;
/// Highest credit load a student may carry in a semester
pub const MAX_CREDITS: i64 = 21;

/// Non-blocking notice attached to an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreditWarning {
    /// Dropping the course leaves the student under the minimum load
    BelowMinimum { remaining: i64, minimum: i64 },
}

/// Returns the new semester total if adding `requested` keeps it within the ceiling
pub fn check_ceiling(current: i64, requested: i64) -> Result<i64, ServiceError> {
    let total = current + requested;
    if total > MAX_CREDITS {
        return Err(ServiceError::CreditLimitExceeded {
            current,
            requested,
            limit: MAX_CREDITS,
        });
    }
    Ok(total)
}

/// Warning for a withdrawal that would leave a non-empty load under the minimum
pub fn withdrawal_warning(current: i64, withdrawn: i64) -> Option<CreditWarning> {
    let remaining = current - withdrawn;
    (remaining > 0 && remaining < MIN_CREDITS).then_some(CreditWarning::BelowMinimum {
        remaining,
        minimum: MIN_CREDITS,
    })
}
