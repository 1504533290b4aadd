use crate::error::AppError;

/// Validate an integer field against an inclusive range.
pub fn validate_range(field: &str, value: i32, min: i32, max: i32) -> Result<(), AppError> {
    if value < min || value > max {
        return Err(AppError::field(
            field,
            format!("Value must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Medication names: letters, digits, `-` and `_`.
pub fn is_valid_medication_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Medication codes: upper case letters, digits and `_`.
pub fn is_valid_medication_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
