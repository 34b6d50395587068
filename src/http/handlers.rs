use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::app::engagement::EngagementService;
use crate::app::posts::{PostError, PostService};
use crate::app::social::SocialService;
use crate::app::users::UserService;
use crate::domain::post::{Post, PostWithReplies};
use crate::domain::user::UserResponse;
use crate::http::extract::{AppForm, AppJson, AppPath, AppQuery};
use crate::http::{AppError, AuthUser};
use crate::infra::store::StoreError;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "store ping failed");
            "degraded"
        }
    };

    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<crate::app::auth::TokenPair> for TokenResponse {
    fn from(tokens: crate::app::auth::TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer",
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    AppForm(payload): AppForm<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::unauthorized("Incorrect username or password"));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::unauthorized("Incorrect username or password"));
    }

    let tokens = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to login");
            AppError::internal("failed to login")
        })?;

    match tokens {
        Some(tokens) => Ok(Json(tokens.into())),
        None => Err(AppError::unauthorized("Incorrect username or password")),
    }
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if payload.refresh_token.trim().is_empty() {
        return Err(AppError::bad_request("refresh_token is required"));
    }

    let tokens = state
        .auth_service()
        .refresh(&payload.refresh_token)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to refresh token");
            AppError::internal("failed to refresh token")
        })?;

    match tokens {
        Some(tokens) => Ok(Json(tokens.into())),
        None => Err(AppError::unauthorized("Invalid refresh token")),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(state.store.clone());
    let users = service.list_users().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list users");
        AppError::internal("failed to list users")
    })?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user_by_username(
    AppPath(username): AppPath<String>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(state.store.clone());
    let user = service.get_by_username(&username).await.map_err(|err| {
        tracing::error!(error = ?err, username = %username, "failed to fetch user");
        AppError::internal("failed to fetch user")
    })?;

    match user {
        Some(user) => Ok(Json(user.into())),
        None => Err(AppError::not_found("User not found")),
    }
}

#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::bad_request("username cannot be empty"));
    }
    if payload.email.trim().is_empty() {
        return Err(AppError::bad_request("email cannot be empty"));
    }
    if payload.password.trim().len() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at least 8 characters"));
    }
    if payload.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::bad_request("password must be at most 128 characters"));
    }

    let service = UserService::new(state.store.clone());
    let user = service
        .create_user(
            payload.email,
            payload.username,
            &payload.password,
            payload.avatar,
            payload.bio,
        )
        .await
        .map_err(|err| {
            if let Some(StoreError::Conflict(field)) = err.downcast_ref::<StoreError>() {
                match field.as_str() {
                    "username" => return AppError::conflict("Username already taken"),
                    "email" => return AppError::conflict("Email already taken"),
                    _ => {}
                }
            }
            tracing::error!(error = ?err, "failed to create user");
            AppError::internal("failed to create user")
        })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn follow_user(
    auth: AuthUser,
    AppPath(user_id): AppPath<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = SocialService::new(state.store.clone());
    service
        .follow(auth.user_id, user_id)
        .await
        .map_err(|err| AppError::from_relation(err, "failed to follow user"))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow_user(
    auth: AuthUser,
    AppPath(user_id): AppPath<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = SocialService::new(state.store.clone());
    service
        .unfollow(auth.user_id, user_id)
        .await
        .map_err(|err| AppError::from_relation(err, "failed to unfollow user"))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

fn post_error(err: PostError, context: &'static str) -> AppError {
    match err {
        PostError::ParentNotFound | PostError::UserNotFound => AppError::not_found(err.to_string()),
        PostError::Store(store_err) => {
            tracing::error!(error = ?store_err, "{}", context);
            AppError::internal(context)
        }
    }
}

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let service = PostService::new(state.store.clone());
    let posts = service
        .list_posts()
        .await
        .map_err(|err| post_error(err, "failed to list posts"))?;

    Ok(Json(posts))
}

#[derive(Deserialize)]
pub struct PostRequest {
    pub text: String,
    pub parent_id: Option<i64>,
}

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    if payload.text.trim().is_empty() {
        return Err(AppError::bad_request("Post text cannot be empty"));
    }

    let service = PostService::new(state.store.clone());
    let post = service
        .create_post(auth.user_id, payload.text, payload.parent_id)
        .await
        .map_err(|err| post_error(err, "failed to create post"))?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    AppPath(post_id): AppPath<i64>,
    State(state): State<AppState>,
) -> Result<Json<PostWithReplies>, AppError> {
    let service = PostService::new(state.store.clone());
    let post = service
        .get_post(post_id)
        .await
        .map_err(|err| post_error(err, "failed to fetch post"))?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("Post not found")),
    }
}

#[derive(Deserialize)]
pub struct UserPostsQuery {
    #[serde(default)]
    pub include_replies: bool,
}

pub async fn list_user_posts(
    AppPath(username): AppPath<String>,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserPostsQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let service = PostService::new(state.store.clone());
    let posts = service
        .list_user_posts(&username, query.include_replies)
        .await
        .map_err(|err| post_error(err, "failed to list user posts"))?;

    Ok(Json(posts))
}

/// Answers 201 with the post, matching the status clients already expect.
pub async fn like_post(
    auth: AuthUser,
    AppPath(post_id): AppPath<i64>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let service = EngagementService::new(state.store.clone());
    let post = service
        .like_post(auth.user_id, post_id)
        .await
        .map_err(|err| AppError::from_relation(err, "failed to like post"))?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Also 201, kept for wire compatibility with existing clients.
pub async fn unlike_post(
    auth: AuthUser,
    AppPath(post_id): AppPath<i64>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let service = EngagementService::new(state.store.clone());
    let post = service
        .unlike_post(auth.user_id, post_id)
        .await
        .map_err(|err| AppError::from_relation(err, "failed to unlike post"))?;

    Ok((StatusCode::CREATED, Json(post)))
}
