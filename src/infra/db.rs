use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is required for the postgres store")?;
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout_seconds))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime_seconds))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the pending migrations in `dir` and records them in
    /// `_sqlx_migrations`. Returns how many migrations the directory holds.
    pub async fn migrate(&self, dir: &Path) -> Result<usize> {
        let migrator = Migrator::new(dir)
            .await
            .with_context(|| format!("cannot load migrations from {}", dir.display()))?;
        migrator
            .run(&self.pool)
            .await
            .context("failed to apply migrations")?;

        let known = migrator.iter().count();
        tracing::info!(migrations = known, dir = %dir.display(), "database schema up to date");
        Ok(known)
    }
}
