use anyhow::{anyhow, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::session::RefreshToken;
use crate::infra::store::Store;

const TOKEN_ISSUER: &str = "pamps";

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    access_key: [u8; 32],
    refresh_key: [u8; 32],
    access_ttl_minutes: u64,
    refresh_ttl_days: u64,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn Store>,
        access_key: [u8; 32],
        refresh_key: [u8; 32],
        access_ttl_minutes: u64,
        refresh_ttl_days: u64,
    ) -> Self {
        Self {
            store,
            access_key,
            refresh_key,
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }

    /// `None` when the username is unknown or the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<TokenPair>> {
        let user = match self.store.find_user_by_username(username).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        if user.password_hash.is_empty() {
            return Ok(None);
        }
        if !verify_password(password, &user.password_hash)? {
            return Ok(None);
        }

        let tokens = self.issue_token_pair(user.id).await?;
        tracing::info!(user_id = user.id, "issued token pair");
        Ok(Some(tokens))
    }

    /// Exchanges a live refresh token for a new pair. The presented token is
    /// revoked in the same store operation that records its replacement.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<TokenPair>> {
        let (user_id, refresh_id) = match self.verify_refresh_token(refresh_token) {
            Ok(ids) => ids,
            Err(_) => return Ok(None),
        };
        if self.store.find_user(user_id).await?.is_none() {
            return Ok(None);
        }

        let (pair, next) = self.mint_token_pair(user_id)?;
        let rotated = self
            .store
            .rotate_refresh_token(refresh_id, user_id, &hash_token(refresh_token), &next)
            .await?;
        if !rotated {
            tracing::warn!(user_id, refresh_id = %refresh_id, "refresh token rejected");
            return Ok(None);
        }
        Ok(Some(pair))
    }

    pub async fn issue_token_pair(&self, user_id: i64) -> Result<TokenPair> {
        let (pair, refresh) = self.mint_token_pair(user_id)?;
        self.store.insert_refresh_token(&refresh).await?;
        Ok(pair)
    }

    /// Resolves a bearer token to the user it was issued for. Tokens that
    /// fail decryption, carry the wrong type, or name a user that no longer
    /// exists all yield `None`.
    pub async fn authenticate_access_token(&self, token: &str) -> Result<Option<AuthSession>> {
        let claims = match self.decrypt_claims(token, self.access_key)? {
            Some(claims) => claims,
            None => return Ok(None),
        };
        if !has_token_type(&claims, "access") {
            return Ok(None);
        }
        let user_id = match claim_user_id(&claims) {
            Ok(user_id) => user_id,
            Err(_) => return Ok(None),
        };
        if self.store.find_user(user_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(AuthSession { user_id }))
    }

    fn decrypt_claims(&self, token: &str, key_bytes: [u8; 32]) -> Result<Option<Claims>> {
        let key = SymmetricKey::<V4>::from(&key_bytes)?;
        let mut rules = ClaimsValidationRules::new();
        rules.validate_issuer_with(TOKEN_ISSUER);
        rules.validate_audience_with(TOKEN_ISSUER);

        let untrusted = match UntrustedToken::<Local, V4>::try_from(token) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        let trusted = match local::decrypt(&key, &untrusted, &rules, None, None) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };
        Ok(trusted.payload_claims().cloned())
    }

    fn build_access_claims(&self, user_id: i64) -> Result<Claims> {
        let duration = std::time::Duration::from_secs(self.access_ttl_minutes * 60);
        let mut claims = Claims::new_expires_in(&duration)?;
        claims.issuer(TOKEN_ISSUER)?;
        claims.audience(TOKEN_ISSUER)?;
        claims.subject(&user_id.to_string())?;
        claims.add_additional("typ", "access")?;
        Ok(claims)
    }

    fn build_refresh_claims(
        &self,
        user_id: i64,
        refresh_id: Uuid,
    ) -> Result<(Claims, OffsetDateTime)> {
        let duration = std::time::Duration::from_secs(self.refresh_ttl_days * 24 * 60 * 60);
        let mut claims = Claims::new_expires_in(&duration)?;
        claims.issuer(TOKEN_ISSUER)?;
        claims.audience(TOKEN_ISSUER)?;
        claims.subject(&user_id.to_string())?;
        claims.token_identifier(&refresh_id.to_string())?;
        claims.add_additional("typ", "refresh")?;
        let expires_at = OffsetDateTime::now_utc() + Duration::days(self.refresh_ttl_days as i64);
        Ok((claims, expires_at))
    }

    fn mint_token_pair(&self, user_id: i64) -> Result<(TokenPair, RefreshToken)> {
        let access_claims = self.build_access_claims(user_id)?;
        let access_key = SymmetricKey::<V4>::from(&self.access_key)?;
        let access_token = local::encrypt(&access_key, &access_claims, None, None)?;

        let refresh_id = Uuid::new_v4();
        let (refresh_claims, refresh_expires_at) =
            self.build_refresh_claims(user_id, refresh_id)?;
        let refresh_key = SymmetricKey::<V4>::from(&self.refresh_key)?;
        let refresh_token = local::encrypt(&refresh_key, &refresh_claims, None, None)?;

        let stored = RefreshToken {
            id: refresh_id,
            user_id,
            token_hash: hash_token(&refresh_token),
            expires_at: refresh_expires_at,
        };
        let pair = TokenPair {
            access_token,
            refresh_token,
        };
        Ok((pair, stored))
    }

    fn verify_refresh_token(&self, token: &str) -> Result<(i64, Uuid)> {
        let claims = match self.decrypt_claims(token, self.refresh_key)? {
            Some(claims) => claims,
            None => return Err(anyhow!("invalid refresh token")),
        };
        if !has_token_type(&claims, "refresh") {
            return Err(anyhow!("invalid refresh token"));
        }
        let user_id = claim_user_id(&claims)?;
        let refresh_id = claim_str(&claims, "jti")?;
        Ok((user_id, Uuid::parse_str(refresh_id)?))
    }
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {}", err))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| anyhow!("failed to parse password hash: {}", err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

fn claim_str<'a>(claims: &'a Claims, name: &str) -> Result<&'a str> {
    claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .ok_or_else(|| anyhow!("missing {} claim", name))
}

fn claim_user_id(claims: &Claims) -> Result<i64> {
    let user_id = claim_str(claims, "sub")?.parse::<i64>()?;
    Ok(user_id)
}

fn has_token_type(claims: &Claims, expected: &str) -> bool {
    claims
        .get_claim("typ")
        .and_then(|value| value.as_str())
        .map(|value| value == expected)
        .unwrap_or(false)
}
