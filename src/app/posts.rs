use std::sync::Arc;

use crate::domain::post::{NewPost, Post, PostFilter, PostWithReplies};
use crate::infra::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Parent post not found")]
    ParentNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn Store>,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create_post(
        &self,
        user_id: i64,
        text: String,
        parent_id: Option<i64>,
    ) -> Result<Post, PostError> {
        if let Some(parent_id) = parent_id {
            if self.store.find_post(parent_id).await?.is_none() {
                return Err(PostError::ParentNotFound);
            }
        }

        let post = self
            .store
            .insert_post(NewPost {
                text,
                user_id,
                parent_id,
            })
            .await
            .map_err(|err| match err {
                StoreError::MissingReference(_) if parent_id.is_some() => PostError::ParentNotFound,
                other => PostError::Store(other),
            })?;

        tracing::info!(post_id = post.id, user_id, parent_id = ?post.parent_id, "created post");
        Ok(post)
    }

    /// Root posts only, oldest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, PostError> {
        Ok(self.store.list_posts(&PostFilter::roots()).await?)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Option<PostWithReplies>, PostError> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(None);
        };
        let replies = self.store.list_posts(&PostFilter::replies_to(post.id)).await?;
        Ok(Some(PostWithReplies { post, replies }))
    }

    pub async fn list_user_posts(
        &self,
        username: &str,
        include_replies: bool,
    ) -> Result<Vec<Post>, PostError> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(PostError::UserNotFound)?;
        Ok(self
            .store
            .list_posts(&PostFilter::by_user(user.id, include_replies))
            .await?)
    }
}
