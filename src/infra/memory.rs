//! In-memory [`Store`]. Everything lives behind one [`RwLock`] and is lost
//! when the process exits.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::store::{Store, StoreError};
use crate::domain::engagement::Like;
use crate::domain::post::{NewPost, Post, PostFilter};
use crate::domain::session::RefreshToken;
use crate::domain::social_graph::Social;
use crate::domain::user::{NewUser, User};

struct StoredRefreshToken {
    token: RefreshToken,
    revoked: bool,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    follows: BTreeMap<i64, Social>,
    likes: BTreeSet<(i64, i64)>,
    refresh_tokens: HashMap<Uuid, StoredRefreshToken>,
    last_user_id: i64,
    last_post_id: i64,
    last_follow_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.write()?;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username".into()));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email".into()));
        }

        inner.last_user_id += 1;
        let stored = User {
            id: inner.last_user_id,
            email: user.email,
            username: user.username,
            avatar: user.avatar,
            bio: user.bio,
            password_hash: user.password_hash,
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&post.user_id) {
            return Err(StoreError::MissingReference("user_id".into()));
        }
        if let Some(parent_id) = post.parent_id {
            if !inner.posts.contains_key(&parent_id) {
                return Err(StoreError::MissingReference("parent_id".into()));
            }
        }

        inner.last_post_id += 1;
        let stored = Post {
            id: inner.last_post_id,
            text: post.text,
            date: OffsetDateTime::now_utc(),
            user_id: post.user_id,
            parent_id: post.parent_id,
        };
        inner.posts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        Ok(self
            .read()?
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect())
    }

    async fn find_follow(&self, from_id: i64, to_id: i64) -> Result<Option<Social>, StoreError> {
        Ok(self
            .read()?
            .follows
            .values()
            .find(|edge| edge.from_id == from_id && edge.to_id == to_id)
            .cloned())
    }

    async fn insert_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&from_id) || !inner.users.contains_key(&to_id) {
            return Err(StoreError::MissingReference("user_id".into()));
        }
        if inner
            .follows
            .values()
            .any(|edge| edge.from_id == from_id && edge.to_id == to_id)
        {
            return Ok(false);
        }

        inner.last_follow_id += 1;
        let edge = Social {
            id: inner.last_follow_id,
            date: OffsetDateTime::now_utc(),
            from_id,
            to_id,
        };
        inner.follows.insert(edge.id, edge);
        Ok(true)
    }

    async fn delete_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let before = inner.follows.len();
        inner
            .follows
            .retain(|_, edge| !(edge.from_id == from_id && edge.to_id == to_id));
        Ok(inner.follows.len() < before)
    }

    async fn list_following(&self, user_id: i64) -> Result<Vec<Social>, StoreError> {
        Ok(self
            .read()?
            .follows
            .values()
            .filter(|edge| edge.from_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_followers(&self, user_id: i64) -> Result<Vec<Social>, StoreError> {
        Ok(self
            .read()?
            .follows
            .values()
            .filter(|edge| edge.to_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .likes
            .contains(&(user_id, post_id))
            .then_some(Like { user_id, post_id }))
    }

    async fn insert_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference("user_id".into()));
        }
        if !inner.posts.contains_key(&post_id) {
            return Err(StoreError::MissingReference("post_id".into()));
        }
        Ok(inner.likes.insert((user_id, post_id)))
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
        Ok(self.write()?.likes.remove(&(user_id, post_id)))
    }

    async fn count_likes(&self, post_id: i64) -> Result<i64, StoreError> {
        let inner = self.read()?;
        let count = inner.likes.iter().filter(|(_, p)| *p == post_id).count();
        Ok(count as i64)
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.refresh_tokens.contains_key(&token.id) {
            return Err(StoreError::Conflict("refresh_tokens_pkey".into()));
        }
        inner.refresh_tokens.insert(
            token.id,
            StoredRefreshToken {
                token: token.clone(),
                revoked: false,
            },
        );
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        user_id: i64,
        token_hash: &str,
        next: &RefreshToken,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let now = OffsetDateTime::now_utc();
        let Some(current) = inner.refresh_tokens.get_mut(&id) else {
            return Ok(false);
        };
        if current.revoked
            || current.token.user_id != user_id
            || current.token.token_hash != token_hash
            || current.token.expires_at <= now
        {
            return Ok(false);
        }
        current.revoked = true;

        inner.refresh_tokens.insert(
            next.id,
            StoredRefreshToken {
                token: next.clone(),
                revoked: false,
            },
        );
        Ok(true)
    }
}
