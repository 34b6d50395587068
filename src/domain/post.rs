use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub user_id: i64,
    pub parent_id: Option<i64>,
}

impl Post {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub user_id: i64,
    pub parent_id: Option<i64>,
}

/// A post together with its direct replies.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithReplies {
    #[serde(flatten)]
    pub post: Post,
    pub replies: Vec<Post>,
}

/// Selection applied by [`Store::list_posts`](crate::infra::store::Store::list_posts).
///
/// `parent_id` takes precedence over `include_replies`: when set, only the
/// direct replies of that post are returned. Results are ordered by id.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub user_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub include_replies: bool,
}

impl PostFilter {
    pub fn roots() -> Self {
        Self::default()
    }

    pub fn replies_to(parent_id: i64) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    pub fn by_user(user_id: i64, include_replies: bool) -> Self {
        Self {
            user_id: Some(user_id),
            include_replies,
            ..Self::default()
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(user_id) = self.user_id {
            if post.user_id != user_id {
                return false;
            }
        }
        match self.parent_id {
            Some(parent_id) => post.parent_id == Some(parent_id),
            None => self.include_replies || !post.is_reply(),
        }
    }
}
