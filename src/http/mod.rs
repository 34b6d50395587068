use axum::Router;
use tower_http::normalize_path::NormalizePath;

use crate::AppState;

mod auth;
mod error;
mod extract;
mod handlers;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::auth())
        .merge(routes::users())
        .merge(routes::posts())
        .with_state(state)
}

/// Wraps `router` so `/post/` and `/user/follow/2/` reach the same handlers
/// as their slash-less forms. Trimming has to happen before routing, so this
/// sits outside the router rather than in a `Router::layer`.
pub fn service(router: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router)
}
