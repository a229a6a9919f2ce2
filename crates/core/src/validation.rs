//! Field validators shared by the request DTOs in `jotter-db`.
//!
//! Each function has the `fn(&str) -> Result<(), ValidationError>` shape that
//! `#[validate(custom(function = ...))]` expects.

use validator::ValidationError;

/// Reject strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("This field may not be blank.".into()))
    } else {
        Ok(())
    }
}
