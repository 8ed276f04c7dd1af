use super::ValidationError;

pub const MAX_NAME_LENGTH: usize = 100;

/// Shared check for first/last name fields; the caller maps the result
/// onto the right field variant.
pub fn validate_name(
    name: &str,
    empty: ValidationError,
    too_long: ValidationError,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(empty);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(too_long);
    }

    Ok(())
}
