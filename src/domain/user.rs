use serde::{Deserialize, Serialize};

/// A stored account. The password hash never leaves the service layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub password_hash: String,
}

/// Fields required to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            avatar: user.avatar,
            bio: user.bio,
        }
    }
}
