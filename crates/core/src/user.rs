//! Username and email validation for user management.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length enforced on user creation and password reset.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Validate a username: 3-50 characters of ASCII alphanumerics, `_`, `-`, `.`.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(CoreError::Validation(
            "Username must be between 3 and 50 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(CoreError::Validation(
            "Username may contain only letters, digits, '_', '-' and '.'".into(),
        ));
    }
    Ok(())
}

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username("jane.doe").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("jane doe").is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("editor@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
