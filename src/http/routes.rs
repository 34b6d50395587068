use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn auth() -> Router<AppState> {
    Router::new()
        .route("/token", post(handlers::login))
        .route("/refresh_token", post(handlers::refresh_token))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/user", get(handlers::list_users).post(handlers::create_user))
        .route("/user/:username", get(handlers::get_user_by_username))
        .route(
            "/user/follow/:user_id",
            post(handlers::follow_user).delete(handlers::unfollow_user),
        )
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/post", get(handlers::list_posts).post(handlers::create_post))
        .route("/post/:post_id", get(handlers::get_post))
        .route("/post/user/:username", get(handlers::list_user_posts))
        .route(
            "/post/:post_id/like",
            post(handlers::like_post).delete(handlers::unlike_post),
        )
}
