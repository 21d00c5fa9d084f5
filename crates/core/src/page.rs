//! Page lifecycle: status values, field validation, and the publish
//! state machine.
//!
//! The transition planner is pure. The repository layer asks it what a
//! transition does and then applies the resulting [`TransitionPlan`] inside a
//! transaction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum page title length.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum page description length.
pub const MAX_DESCRIPTION_LEN: usize = 2_000;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageStatus {
    Draft,
    Review,
    Published,
    Archived,
}

impl PageStatus {
    pub const ALL: [PageStatus; 4] = [
        PageStatus::Draft,
        PageStatus::Review,
        PageStatus::Published,
        PageStatus::Archived,
    ];

    /// The stored / wire representation (`"DRAFT"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Draft => "DRAFT",
            PageStatus::Review => "REVIEW",
            PageStatus::Published => "PUBLISHED",
            PageStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid page status '{s}'. Valid statuses: DRAFT, REVIEW, PUBLISHED, ARCHIVED"
                ))
            })
    }
}

impl TryFrom<String> for PageStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a page title (non-blank, <= [`MAX_TITLE_LEN`] chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a page description (<= [`MAX_DESCRIPTION_LEN`] chars).
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// What happens to `published_at` when a transition is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishedAtChange {
    /// Leave the column untouched.
    Keep,
    /// Stamp with the current time.
    SetNow,
    /// Reset to NULL.
    Clear,
}

/// The effects of moving a page from one status to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: PageStatus,
    pub to: PageStatus,
    /// New value of the `published` flag. Always `to == Published`.
    pub published: bool,
    pub published_at: PublishedAtChange,
    /// Whether a `PUBLISH` version snapshot must be written.
    pub create_version: bool,
}

/// Plan a status transition.
///
/// Transitions between statuses are otherwise unconstrained. The rules are:
/// - entering `PUBLISHED` needs at least one block, stamps `published_at`,
///   and snapshots a new version (a republish does the same);
/// - leaving `PUBLISHED` clears `published` and `published_at`.
pub fn plan_transition(
    from: PageStatus,
    to: PageStatus,
    block_count: usize,
) -> Result<TransitionPlan, CoreError> {
    if to == PageStatus::Published {
        if block_count == 0 {
            return Err(CoreError::Validation(
                "Cannot publish a page without content blocks".into(),
            ));
        }
        return Ok(TransitionPlan {
            from,
            to,
            published: true,
            published_at: PublishedAtChange::SetNow,
            create_version: true,
        });
    }

    let published_at = if from == PageStatus::Published {
        PublishedAtChange::Clear
    } else {
        PublishedAtChange::Keep
    };

    Ok(TransitionPlan {
        from,
        to,
        published: false,
        published_at,
        create_version: false,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in PageStatus::ALL {
            assert_eq!(status.as_str().parse::<PageStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_lowercase() {
        assert_matches!("draft".parse::<PageStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_string(&PageStatus::Published).unwrap();
        assert_eq!(json, "\"PUBLISHED\"");
    }

    #[test]
    fn publishing_empty_page_fails() {
        for from in PageStatus::ALL {
            assert_matches!(
                plan_transition(from, PageStatus::Published, 0),
                Err(CoreError::Validation(_))
            );
        }
    }

    #[test]
    fn publishing_sets_flag_and_requests_version() {
        let plan = plan_transition(PageStatus::Review, PageStatus::Published, 3).unwrap();
        assert!(plan.published);
        assert_eq!(plan.published_at, PublishedAtChange::SetNow);
        assert!(plan.create_version);
    }

    #[test]
    fn republish_creates_another_version() {
        let plan = plan_transition(PageStatus::Published, PageStatus::Published, 1).unwrap();
        assert!(plan.create_version);
        assert_eq!(plan.published_at, PublishedAtChange::SetNow);
    }

    #[test]
    fn leaving_published_clears_publication() {
        for to in [PageStatus::Draft, PageStatus::Review, PageStatus::Archived] {
            let plan = plan_transition(PageStatus::Published, to, 2).unwrap();
            assert!(!plan.published);
            assert_eq!(plan.published_at, PublishedAtChange::Clear);
            assert!(!plan.create_version);
        }
    }

    #[test]
    fn other_transitions_are_unchecked() {
        // Archived straight back to draft, draft straight to archived: both allowed.
        let plan = plan_transition(PageStatus::Archived, PageStatus::Draft, 0).unwrap();
        assert_eq!(plan.published_at, PublishedAtChange::Keep);
        let plan = plan_transition(PageStatus::Draft, PageStatus::Archived, 0).unwrap();
        assert!(!plan.published);
    }

    #[test]
    fn title_validation() {
        assert!(validate_title("Home").is_ok());
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }
}
