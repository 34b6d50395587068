use std::sync::Arc;

use crate::app::RelationError;
use crate::domain::social_graph::Social;
use crate::infra::store::Store;

/// Follow graph operations. Both mutations are idempotent; only the target
/// user has to exist, never the edge.
#[derive(Clone)]
pub struct SocialService {
    store: Arc<dyn Store>,
}

impl SocialService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn follow(&self, actor_id: i64, target_id: i64) -> Result<(), RelationError> {
        self.ensure_target(actor_id, target_id).await?;

        if self.store.find_follow(actor_id, target_id).await?.is_some() {
            tracing::debug!(from_id = actor_id, to_id = target_id, "already following");
            return Ok(());
        }

        let inserted = self.store.insert_follow(actor_id, target_id).await?;
        if inserted {
            tracing::info!(from_id = actor_id, to_id = target_id, "followed user");
        }
        Ok(())
    }

    pub async fn unfollow(&self, actor_id: i64, target_id: i64) -> Result<(), RelationError> {
        self.ensure_target(actor_id, target_id).await?;

        if self.store.find_follow(actor_id, target_id).await?.is_none() {
            tracing::debug!(from_id = actor_id, to_id = target_id, "not following");
            return Ok(());
        }

        let deleted = self.store.delete_follow(actor_id, target_id).await?;
        if deleted {
            tracing::info!(from_id = actor_id, to_id = target_id, "unfollowed user");
        }
        Ok(())
    }

    pub async fn is_following(&self, from_id: i64, to_id: i64) -> Result<bool, RelationError> {
        Ok(self.store.find_follow(from_id, to_id).await?.is_some())
    }

    pub async fn following(&self, user_id: i64) -> Result<Vec<Social>, RelationError> {
        Ok(self.store.list_following(user_id).await?)
    }

    pub async fn followers(&self, user_id: i64) -> Result<Vec<Social>, RelationError> {
        Ok(self.store.list_followers(user_id).await?)
    }

    async fn ensure_target(&self, actor_id: i64, target_id: i64) -> Result<(), RelationError> {
        if target_id <= 0 || target_id == actor_id {
            return Err(RelationError::InvalidTarget);
        }
        if self.store.find_user(target_id).await?.is_none() {
            return Err(RelationError::TargetNotFound);
        }
        Ok(())
    }
}
