//! URL slug generation and validation for pages, organizations, and
//! components.

use crate::error::CoreError;

/// Maximum slug length accepted anywhere in the system.
pub const MAX_SLUG_LEN: usize = 120;

/// Generate a URL-safe slug from a human-readable title.
///
/// Lowercases ASCII, maps every other character to a hyphen, collapses runs
/// of hyphens, and trims them from both ends. The result is truncated to
/// [`MAX_SLUG_LEN`] on a character boundary.
pub fn generate_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = true;
    for c in title.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    let mut slug = result.trim_matches('-').to_string();
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    slug
}

/// Validate a slug: non-empty, at most [`MAX_SLUG_LEN`] characters, only
/// lowercase alphanumerics and single inner hyphens.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(CoreError::Validation(
            "Slug must not start or end with a hyphen or contain consecutive hyphens".into(),
        ));
    }
    Ok(())
}

/// Resolve the slug to store: validate an explicit one, or derive one from
/// `title` when none was given.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> Result<String, CoreError> {
    match explicit {
        Some(s) => {
            validate_slug(s)?;
            Ok(s.to_string())
        }
        None => {
            let generated = generate_slug(title);
            validate_slug(&generated).map_err(|_| {
                CoreError::Validation(format!(
                    "Cannot derive a slug from title '{title}'; provide one explicitly"
                ))
            })?;
            Ok(generated)
        }
    }
}
