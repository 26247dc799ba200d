//! Query parameter types for API handlers.

use serde::Deserialize;
use userdir_core::filter::{non_empty, FilterCriteria, DEFAULT_MAX_AGE, DEFAULT_MIN_AGE};
use userdir_core::pagination::{clamp_page, clamp_page_size};

/// Listing parameters (`?search=&nationality=&hobby=&minAge=&maxAge=&page=&limit=`).
///
/// Missing values fall back to the filter defaults; blank `nationality` and
/// `hobby` mean "any". `limit` is clamped rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQueryParams {
    pub search: Option<String>,
    pub nationality: Option<String>,
    pub hobby: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl UserQueryParams {
    /// The requested page, clamped to `>= 1`.
    pub fn page(&self) -> u32 {
        clamp_page(self.page)
    }

    /// Convert into filter criteria. Call [`FilterCriteria::validate`] after.
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone().unwrap_or_default(),
            nationality: non_empty(self.nationality.clone()),
            hobby: non_empty(self.hobby.clone()),
            min_age: self.min_age.unwrap_or(DEFAULT_MIN_AGE),
            max_age: self.max_age.unwrap_or(DEFAULT_MAX_AGE),
            page_size: clamp_page_size(self.limit),
        }
    }
}
