//! Filter criteria for the directory listing.
//!
//! The same struct drives the backend query engine and the client
//! controller, so validation and matching live here once.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::user::User;

// ---------------------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------------------

/// Lower age bound applied when the caller does not pick one.
pub const DEFAULT_MIN_AGE: u32 = 18;

/// Upper age bound applied when the caller does not pick one.
pub const DEFAULT_MAX_AGE: u32 = 100;

/// Records per page when the caller does not pick a size.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page a single query may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Ages above this are rejected as nonsensical input.
pub const MAX_AGE: u32 = 150;

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// Everything that selects a result set, apart from the page number.
///
/// Changing any field starts a new accumulation epoch on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the member's full name. Empty matches all.
    pub search: String,
    /// Exact nationality, or any when `None`.
    pub nationality: Option<String>,
    /// Required hobby, or any when `None`.
    pub hobby: Option<String>,
    pub min_age: u32,
    pub max_age: u32,
    pub page_size: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            nationality: None,
            hobby: None,
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FilterCriteria {
    /// Builder-style search text setter.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Builder-style age range setter.
    pub fn with_age_range(mut self, min_age: u32, max_age: u32) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    /// Builder-style page size setter.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Select `nationality`, or clear it if it is already the active choice.
    pub fn toggle_nationality(&mut self, nationality: &str) {
        self.nationality = toggle(self.nationality.take(), nationality);
    }

    /// Select `hobby`, or clear it if it is already the active choice.
    pub fn toggle_hobby(&mut self, hobby: &str) {
        self.hobby = toggle(self.hobby.take(), hobby);
    }

    /// Check the criteria before they are sent anywhere.
    ///
    /// Rules:
    /// - `min_age` must not exceed `max_age`.
    /// - Neither age may exceed [`MAX_AGE`].
    /// - `page_size` must be within `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_age > self.max_age {
            return Err(CoreError::Validation(format!(
                "min_age ({}) must not exceed max_age ({})",
                self.min_age, self.max_age
            )));
        }
        if self.max_age > MAX_AGE {
            return Err(CoreError::Validation(format!(
                "max_age must not exceed {MAX_AGE}"
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Whether `user` belongs to the result set these criteria select.
    pub fn matches(&self, user: &User) -> bool {
        let search_match = self.search.is_empty()
            || user
                .full_name()
                .to_lowercase()
                .contains(&self.search.to_lowercase());

        let nationality_match = self
            .nationality
            .as_deref()
            .map_or(true, |n| user.nationality == n);

        let hobby_match = self.hobby.as_deref().map_or(true, |h| user.has_hobby(h));

        let age_match = user.age >= self.min_age && user.age <= self.max_age;

        search_match && nationality_match && hobby_match && age_match
    }
}

/// Treat an empty selection parameter as "no selection".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn toggle(current: Option<String>, choice: &str) -> Option<String> {
    match current {
        Some(active) if active == choice => None,
        _ => Some(choice.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn user(first: &str, last: &str, age: u32, nationality: &str, hobbies: &[&str]) -> User {
        User {
            id: format!("user-{first}-{last}"),
            avatar: String::new(),
            first_name: first.into(),
            last_name: last.into(),
            age,
            nationality: nationality.into(),
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[test]
    fn default_criteria_match_reference_defaults() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.search, "");
        assert_eq!(criteria.nationality, None);
        assert_eq!(criteria.hobby, None);
        assert_eq!(criteria.min_age, 18);
        assert_eq!(criteria.max_age, 100);
        assert_eq!(criteria.page_size, 12);
        assert!(criteria.validate().is_ok());
    }

    #[test]
    fn search_is_case_insensitive_over_full_name() {
        let criteria = FilterCriteria::default().with_search("JOHN");
        assert!(criteria.matches(&user("John", "Smith", 30, "Dutch", &[])));
        assert!(criteria.matches(&user("Mary", "Johnson", 30, "Dutch", &[])));
        assert!(!criteria.matches(&user("Mary", "Smith", 30, "Dutch", &[])));
    }

    #[test]
    fn search_spans_the_space_between_names() {
        let criteria = FilterCriteria::default().with_search("y sm");
        assert!(criteria.matches(&user("Mary", "Smith", 30, "Dutch", &[])));
    }

    #[test]
    fn nationality_and_hobby_are_exact() {
        let mut criteria = FilterCriteria::default();
        criteria.nationality = Some("German".into());
        criteria.hobby = Some("Chess".into());

        assert!(criteria.matches(&user("A", "B", 40, "German", &["Chess", "Yoga"])));
        assert!(!criteria.matches(&user("A", "B", 40, "Germany", &["Chess"])));
        assert!(!criteria.matches(&user("A", "B", 40, "German", &["Chessboxing"])));
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let criteria = FilterCriteria::default().with_age_range(20, 30);
        assert!(criteria.matches(&user("A", "B", 20, "Dutch", &[])));
        assert!(criteria.matches(&user("A", "B", 30, "Dutch", &[])));
        assert!(!criteria.matches(&user("A", "B", 19, "Dutch", &[])));
        assert!(!criteria.matches(&user("A", "B", 31, "Dutch", &[])));
    }

    #[test]
    fn inverted_age_range_is_rejected() {
        let criteria = FilterCriteria::default().with_age_range(60, 30);
        assert_matches!(criteria.validate(), Err(CoreError::Validation(msg)) if msg.contains("min_age"));
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        assert!(FilterCriteria::default().with_page_size(0).validate().is_err());
        assert!(FilterCriteria::default().with_page_size(101).validate().is_err());
        assert!(FilterCriteria::default().with_page_size(100).validate().is_ok());
    }

    #[test]
    fn absurd_max_age_is_rejected() {
        let criteria = FilterCriteria::default().with_age_range(18, 200);
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn toggling_the_active_choice_clears_it() {
        let mut criteria = FilterCriteria::default();
        criteria.toggle_nationality("French");
        assert_eq!(criteria.nationality.as_deref(), Some("French"));
        criteria.toggle_nationality("Italian");
        assert_eq!(criteria.nationality.as_deref(), Some("Italian"));
        criteria.toggle_nationality("Italian");
        assert_eq!(criteria.nationality, None);

        criteria.toggle_hobby("Chess");
        criteria.toggle_hobby("Chess");
        assert_eq!(criteria.hobby, None);
    }

    #[test]
    fn blank_selection_parameters_mean_any() {
        assert_eq!(non_empty(Some("".into())), None);
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("Dutch".into())), Some("Dutch".into()));
        assert_eq!(non_empty(None), None);
    }
}
