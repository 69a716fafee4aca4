//! Domain layer entry modules.

mod actor;
pub mod comments;
pub mod posts;
pub mod saved;

pub use actor::Actor;

use crate::error::ValidationError;

/// Trim `raw` and require its length in characters to be within `min..=max`.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(ValidationError::FieldLength { field, min, max });
    }
    Ok(trimmed.to_string())
}
