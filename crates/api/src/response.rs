//! Shared response envelope types for API handlers.
//!
//! Auxiliary endpoints answer with a `{ "data": ... }` envelope. The user
//! listing already carries `data` inside [`ResultPage`] and is returned as-is.
//!
//! [`ResultPage`]: userdir_core::pagination::ResultPage

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: facets }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
