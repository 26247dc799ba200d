//! Handlers for the member directory (`/users`, `/facets`).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use userdir_core::dataset::{HOBBIES, NATIONALITIES};
use userdir_core::error::CoreError;
use userdir_core::filter::{MAX_AGE, MAX_PAGE_SIZE};
use userdir_core::pagination::ResultPage;
use userdir_core::user::User;

use crate::error::AppResult;
use crate::query::UserQueryParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filter options the client offers in its panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub nationalities: &'static [&'static str],
    pub hobbies: &'static [&'static str],
    pub max_age: u32,
    pub max_page_size: u32,
}

/// GET /api/users
///
/// Returns one page of members matching the query, with the total number of
/// matches across all pages.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserQueryParams>,
) -> AppResult<Json<ResultPage<User>>> {
    let criteria = params.to_criteria();
    criteria.validate()?;

    let page = state.directory.query(&criteria, params.page());
    tracing::debug!(
        page = page.page,
        limit = page.page_size,
        total = page.total_matching,
        returned = page.records.len(),
        "Listed users",
    );
    Ok(Json(page))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = state
        .directory
        .get(&id)
        .cloned()
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/facets
pub async fn facets() -> Json<DataResponse<Facets>> {
    Json(DataResponse {
        data: Facets {
            nationalities: NATIONALITIES,
            hobbies: HOBBIES,
            max_age: MAX_AGE,
            max_page_size: MAX_PAGE_SIZE,
        },
    })
}
