pub mod auth;
pub mod engagement;
pub mod posts;
pub mod social;
pub mod users;

use crate::infra::store::StoreError;

/// Failures of the follow and like operations. Everything except `Store` is
/// an expected outcome of normal traffic.
#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// Non-positive target id, or the actor targeting themselves.
    #[error("Invalid user_id")]
    InvalidTarget,

    #[error("User not found")]
    TargetNotFound,

    #[error("Post not found")]
    PostNotFound,

    #[error("Like not found")]
    LikeNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
