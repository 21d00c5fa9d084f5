//! Organization naming rules.

use crate::error::CoreError;

/// Maximum organization name length.
pub const MAX_NAME_LEN: usize = 120;

/// Validate an organization display name (non-blank, bounded length).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Organization name must not be empty".into(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Organization name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}
