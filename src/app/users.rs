use anyhow::Result;
use std::sync::Arc;

use crate::app::auth::hash_password;
use crate::domain::user::{NewUser, User};
use crate::infra::store::Store;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Hashes `password` and stores the user. A taken username or email comes
    /// back as a [`StoreError::Conflict`](crate::infra::store::StoreError)
    /// inside the `anyhow::Error`.
    pub async fn create_user(
        &self,
        email: String,
        username: String,
        password: &str,
        avatar: Option<String>,
        bio: Option<String>,
    ) -> Result<User> {
        let password_hash = hash_password(password)?;
        let user = self
            .store
            .insert_user(NewUser {
                email,
                username,
                avatar,
                bio,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "created user");
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.store.find_user_by_username(username).await?)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users().await?)
    }
}
