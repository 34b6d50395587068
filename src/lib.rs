pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use crate::app::auth::AuthService;
use crate::infra::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub paseto_access_key: [u8; 32],
    pub paseto_refresh_key: [u8; 32],
    pub access_ttl_minutes: u64,
    pub refresh_ttl_days: u64,
}

impl AppState {
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.store.clone(),
            self.paseto_access_key,
            self.paseto_refresh_key,
            self.access_ttl_minutes,
            self.refresh_ttl_days,
        )
    }
}
