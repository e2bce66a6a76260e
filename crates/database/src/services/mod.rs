use models::error::ValidationError;
use std::collections::HashMap;

pub mod activity;
pub mod activity_query;
pub mod auth;
pub mod course;
pub mod organization;
pub mod program;
pub mod semester;
pub mod teaching;
pub mod user;

/// Trimmed text, or the missing field error when nothing is left
pub(crate) fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Trimmed text; blank becomes `None`
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn count_ids(ids: impl IntoIterator<Item = i32>) -> HashMap<i32, u64> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    counts
}
