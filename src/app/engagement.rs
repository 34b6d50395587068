use std::sync::Arc;

use crate::app::RelationError;
use crate::domain::post::Post;
use crate::infra::store::Store;

/// Like/unlike on posts. Both return the post so callers can echo it back.
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn Store>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// A repeated like is absorbed by the store's `(user_id, post_id)` key.
    pub async fn like_post(&self, user_id: i64, post_id: i64) -> Result<Post, RelationError> {
        let post = self.existing_post(post_id).await?;

        let created = self.store.insert_like(user_id, post_id).await?;
        if !created {
            tracing::debug!(user_id, post_id, "post already liked");
        }
        Ok(post)
    }

    pub async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<Post, RelationError> {
        let post = self.existing_post(post_id).await?;

        if self.store.find_like(user_id, post_id).await?.is_none() {
            return Err(RelationError::LikeNotFound);
        }
        if !self.store.delete_like(user_id, post_id).await? {
            // Removed concurrently between the lookup and the delete.
            return Err(RelationError::LikeNotFound);
        }
        Ok(post)
    }

    pub async fn has_liked(&self, user_id: i64, post_id: i64) -> Result<bool, RelationError> {
        Ok(self.store.find_like(user_id, post_id).await?.is_some())
    }

    pub async fn like_count(&self, post_id: i64) -> Result<i64, RelationError> {
        Ok(self.store.count_likes(post_id).await?)
    }

    async fn existing_post(&self, post_id: i64) -> Result<Post, RelationError> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or(RelationError::PostNotFound)
    }
}
