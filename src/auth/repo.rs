use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::User;
use crate::db::{map_lookup_err, map_write_err};
use crate::errors::Result;

/// Storage capability for users. Every layer of the user stack implements it.
///
/// Single-record lookups return [`ModelError::NotFound`] when nothing
/// matches; any other failure is [`ModelError::Internal`].
///
/// [`ModelError::NotFound`]: crate::errors::ModelError::NotFound
/// [`ModelError::Internal`]: crate::errors::ModelError::Internal
#[async_trait]
pub trait UserDb: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<User>;
    async fn by_email(&self, email: &str) -> Result<User>;
    /// Look up by remember token. The postgres layer expects the hash; the
    /// validator accepts the plaintext token and hashes it.
    async fn by_remember(&self, token: &str) -> Result<User>;

    /// Insert the user, filling in `id`, `created_at` and `updated_at`.
    async fn create(&self, user: &mut User) -> Result<()>;
    async fn update(&self, user: &mut User) -> Result<()>;
    async fn delete(&self, id: i64) -> Result<()>;
}

/// Postgres-backed [`UserDb`].
#[derive(Clone)]
pub struct PgUserDb {
    db: PgPool,
}

impl PgUserDb {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, remember_hash, created_at, updated_at";

#[async_trait]
impl UserDb for PgUserDb {
    async fn by_id(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_lookup_err(e, "user by id"))
    }

    async fn by_email(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_lookup_err(e, "user by email"))
    }

    async fn by_remember(&self, remember_hash: &str) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE remember_hash = $1"
        ))
        .bind(remember_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_lookup_err(e, "user by remember hash"))
    }

    async fn create(&self, user: &mut User) -> Result<()> {
        let (id, created_at, updated_at) = sqlx::query_as::<_, (i64, OffsetDateTime, OffsetDateTime)>(
            r#"
            INSERT INTO users (name, email, password_hash, remember_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.remember_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_err(e, "create user"))?;

        user.id = id;
        user.created_at = Some(created_at);
        user.updated_at = Some(updated_at);
        Ok(())
    }

    async fn update(&self, user: &mut User) -> Result<()> {
        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            UPDATE users
               SET name = $2, email = $3, password_hash = $4, remember_hash = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.remember_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_err(e, "update user"))?;

        user.updated_at = Some(updated_at);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| map_write_err(e, "delete user"))?;
        Ok(())
    }
}
