//! Persistence contract shared by the services.
//!
//! [`Store`] is a plain data-access layer: existence checks, inserts and
//! deletes. Validation and the follow/like rules live in `crate::app`.
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`PgStore`](crate::infra::postgres::PgStore) | Production, PostgreSQL via sqlx |
//! | [`MemoryStore`](crate::infra::memory::MemoryStore) | Tests and throwaway local runs |

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::engagement::Like;
use crate::domain::post::{NewPost, Post, PostFilter};
use crate::domain::session::RefreshToken;
use crate::domain::social_graph::Social;
use crate::domain::user::{NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the offending field
    /// (`username`, `email`) or the raw constraint name.
    #[error("conflict on {0}")]
    Conflict(String),

    /// A referenced row does not exist (foreign key violation).
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;

    // --- Users ---------------------------------------------------------------

    /// Returns [`StoreError::Conflict`] when the username or email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    // --- Posts ---------------------------------------------------------------

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError>;

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError>;

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError>;

    // --- Follows -------------------------------------------------------------

    async fn find_follow(&self, from_id: i64, to_id: i64) -> Result<Option<Social>, StoreError>;

    /// Returns `false` when the edge already existed.
    async fn insert_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError>;

    /// Returns `false` when there was no edge to delete.
    async fn delete_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError>;

    /// Edges leaving `user_id`, oldest first.
    async fn list_following(&self, user_id: i64) -> Result<Vec<Social>, StoreError>;

    /// Edges arriving at `user_id`, oldest first.
    async fn list_followers(&self, user_id: i64) -> Result<Vec<Social>, StoreError>;

    // --- Likes ---------------------------------------------------------------

    async fn find_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, StoreError>;

    /// Returns `false` when the like already existed.
    async fn insert_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError>;

    async fn delete_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError>;

    async fn count_likes(&self, post_id: i64) -> Result<i64, StoreError>;

    // --- Refresh tokens ------------------------------------------------------

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError>;

    /// Revokes the live token `(id, user_id, token_hash)` and stores `next` in
    /// its place, atomically. Returns `false` without writing anything when the
    /// presented token is unknown, revoked or expired.
    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        user_id: i64,
        token_hash: &str,
        next: &RefreshToken,
    ) -> Result<bool, StoreError>;
}
