//! Page slicing and the listing response envelope.

use serde::{Deserialize, Serialize};

use crate::filter::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// One page of a filtered listing plus the size of the whole result set.
///
/// Serialized as `{"data", "total", "page", "limit", "totalPages"}` so the
/// listing endpoint and its clients agree on one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<R> {
    #[serde(rename = "data")]
    pub records: Vec<R>,
    /// Number of records matching the filter across all pages.
    #[serde(rename = "total")]
    pub total_matching: u64,
    /// 1-based page number this slice represents.
    pub page: u32,
    #[serde(rename = "limit")]
    pub page_size: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<R> ResultPage<R> {
    /// An empty page for a result set with no matches.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            records: Vec::new(),
            total_matching: 0,
            page,
            page_size,
            total_pages: 0,
        }
    }
}

/// `ceil(total / page_size)`; zero when `page_size` is zero.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// Clamp a user-provided page number to `>= 1`.
pub fn clamp_page(page: Option<u32>) -> u32 {
    page.unwrap_or(1).max(1)
}

/// Clamp a user-provided page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<u32>) -> u32 {
    page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Slice page `page` (1-based) of `matching` into a [`ResultPage`].
///
/// Pages past the end are empty but still report the full total.
pub fn paginate<R: Clone>(matching: &[R], page: u32, page_size: u32) -> ResultPage<R> {
    let page = page.max(1);
    let total = matching.len() as u64;
    if page_size == 0 {
        return ResultPage {
            total_matching: total,
            ..ResultPage::empty(page, page_size)
        };
    }

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let records = matching
        .iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();

    ResultPage {
        records,
        total_matching: total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
