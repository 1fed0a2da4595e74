use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info, warn};

use crate::auth::repo::PgUserDb;
use crate::auth::services::{user_service, UserService};
use crate::config::{AuthConfig, DbConfig};
use crate::errors::ModelError;
use crate::galleries::repo::PgGalleryDb;
use crate::galleries::services::{gallery_service, GalleryService};

/// Name of the unique constraint on `users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// All model services, sharing one connection pool.
#[derive(Clone)]
pub struct Services {
    pub user: Arc<dyn UserService>,
    pub gallery: Arc<dyn GalleryService>,
    db: PgPool,
}

impl Services {
    pub async fn connect(db_cfg: &DbConfig, auth: &AuthConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(db_cfg.max_connections)
            .acquire_timeout(Duration::from_secs(db_cfg.acquire_timeout_secs))
            .connect(&db_cfg.url)
            .await
            .context("connect to database")?;
        Ok(Self::new(db, auth))
    }

    pub fn new(db: PgPool, auth: &AuthConfig) -> Self {
        let user = user_service(Arc::new(PgUserDb::new(db.clone())), auth);
        let gallery = gallery_service(Arc::new(PgGalleryDb::new(db.clone())));
        Self::from_parts(Arc::new(user), Arc::new(gallery), db)
    }

    /// Build from already assembled services.
    pub fn from_parts(
        user: Arc<dyn UserService>,
        gallery: Arc<dyn GalleryService>,
        db: PgPool,
    ) -> Self {
        Self { user, gallery, db }
    }

    /// Apply pending migrations from `./migrations`.
    pub async fn auto_migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        info!("migrations applied");
        Ok(())
    }

    /// Drop every table and rebuild the schema. Development only.
    pub async fn destructive_reset(&self) -> anyhow::Result<()> {
        warn!("dropping all tables");
        sqlx::query("DROP TABLE IF EXISTS galleries, users, _sqlx_migrations")
            .execute(&self.db)
            .await
            .context("drop tables")?;
        self.auto_migrate().await
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

/// Translate a failed single-row lookup.
pub(crate) fn map_lookup_err(e: sqlx::Error, op: &'static str) -> ModelError {
    match e {
        sqlx::Error::RowNotFound => ModelError::NotFound,
        other => {
            error!(error = %other, op, "query failed");
            ModelError::Internal(anyhow::Error::new(other).context(op))
        }
    }
}

/// Translate a failed insert/update/delete.
///
/// A unique violation on the email column means another user won the race
/// past the validator's availability check.
pub(crate) fn map_write_err(e: sqlx::Error, op: &'static str) -> ModelError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERS_EMAIL_KEY) {
            warn!(op, "email unique constraint violated");
            return ModelError::EmailTaken;
        }
    }
    map_lookup_err(e, op)
}
