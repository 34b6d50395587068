use time::OffsetDateTime;
use uuid::Uuid;

/// Persisted half of an issued refresh token. Only the sha256 of the token
/// is stored.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
}
