use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::db::Db;
use super::store::{Store, StoreError};
use crate::domain::engagement::Like;
use crate::domain::post::{NewPost, Post, PostFilter};
use crate::domain::session::RefreshToken;
use crate::domain::social_graph::Social;
use crate::domain::user::{NewUser, User};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let field = match constraint.as_str() {
                        "users_username_key" => "username".to_string(),
                        "users_email_key" => "email".to_string(),
                        _ => constraint,
                    };
                    return StoreError::Conflict(field);
                }
                Some(FOREIGN_KEY_VIOLATION) => return StoreError::MissingReference(constraint),
                _ => {}
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// [`Store`] backed by the PostgreSQL schema in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        password_hash: row.get("password_hash"),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        text: row.get("text"),
        date: row.get("date"),
        user_id: row.get("user_id"),
        parent_id: row.get("parent_id"),
    }
}

fn social_from_row(row: &PgRow) -> Social {
    Social {
        id: row.get("id"),
        date: row.get("date"),
        from_id: row.get("from_id"),
        to_id: row.get("to_id"),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            "INSERT INTO users (email, username, avatar, bio, password_hash) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, email, username, avatar, bio, password_hash",
        )
        .bind(user.email)
        .bind(user.username)
        .bind(user.avatar)
        .bind(user.bio)
        .bind(user.password_hash)
        .fetch_one(self.db.pool())
        .await?;

        Ok(user_from_row(&row))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, username, avatar, bio, password_hash \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, username, avatar, bio, password_hash \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, email, username, avatar, bio, password_hash \
             FROM users ORDER BY id",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query(
            "INSERT INTO posts (text, user_id, parent_id) VALUES ($1, $2, $3) \
             RETURNING id, text, date, user_id, parent_id",
        )
        .bind(post.text)
        .bind(post.user_id)
        .bind(post.parent_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(post_from_row(&row))
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query(
            "SELECT id, text, date, user_id, parent_id FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, StoreError> {
        // $2 selects replies of one parent; otherwise $3 decides whether
        // replies are mixed in with root posts.
        let rows = sqlx::query(
            "SELECT id, text, date, user_id, parent_id FROM posts \
             WHERE ($1::BIGINT IS NULL OR user_id = $1) \
               AND CASE WHEN $2::BIGINT IS NOT NULL THEN parent_id = $2 \
                        ELSE ($3 OR parent_id IS NULL) END \
             ORDER BY id",
        )
        .bind(filter.user_id)
        .bind(filter.parent_id)
        .bind(filter.include_replies)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn find_follow(&self, from_id: i64, to_id: i64) -> Result<Option<Social>, StoreError> {
        let row = sqlx::query(
            "SELECT id, date, from_id, to_id FROM social WHERE from_id = $1 AND to_id = $2",
        )
        .bind(from_id)
        .bind(to_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(social_from_row))
    }

    async fn insert_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO social (from_id, to_id) VALUES ($1, $2) \
             ON CONFLICT (from_id, to_id) DO NOTHING",
        )
        .bind(from_id)
        .bind(to_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_follow(&self, from_id: i64, to_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM social WHERE from_id = $1 AND to_id = $2")
            .bind(from_id)
            .bind(to_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_following(&self, user_id: i64) -> Result<Vec<Social>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, date, from_id, to_id FROM social WHERE from_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(social_from_row).collect())
    }

    async fn list_followers(&self, user_id: i64) -> Result<Vec<Social>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, date, from_id, to_id FROM social WHERE to_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(social_from_row).collect())
    }

    async fn find_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, StoreError> {
        let row = sqlx::query("SELECT user_id, post_id FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| Like {
            user_id: row.get("user_id"),
            post_id: row.get("post_id"),
        }))
    }

    async fn insert_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, user_id: i64, post_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_likes(&self, post_id: i64) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    async fn insert_refresh_token(&self, token: &RefreshToken) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        user_id: i64,
        token_hash: &str,
        next: &RefreshToken,
    ) -> Result<bool, StoreError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(next.id)
        .bind(next.user_id)
        .bind(&next.token_hash)
        .bind(next.expires_at)
        .execute(&mut *tx)
        .await?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens \
             SET revoked_at = now(), replaced_by = $4 \
             WHERE id = $1 \
               AND user_id = $2 \
               AND token_hash = $3 \
               AND revoked_at IS NULL \
               AND expires_at > now()",
        )
        .bind(id)
        .bind(user_id)
        .bind(token_hash)
        .bind(next.id)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
