use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Member directory routes.
///
/// ```text
/// GET /users        list_users
/// GET /users/{id}   get_user
/// GET /facets       facets
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/facets", get(users::facets))
}
