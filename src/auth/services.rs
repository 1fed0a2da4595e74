use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::auth::password::spawn_verify_password;
use crate::auth::repo::UserDb;
use crate::auth::repo_types::User;
use crate::auth::validator::UserValidator;
use crate::config::AuthConfig;
use crate::errors::{ModelError, Result};

/// Everything callers may do with users.
#[async_trait]
pub trait UserService: UserDb {
    /// Verify an email/password pair.
    ///
    /// Unknown email is `NotFound`, a wrong password is `PasswordIncorrect`;
    /// callers should present both the same way.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;
}

pub struct UserServiceImpl {
    db: Arc<dyn UserDb>,
    pepper: String,
}

impl UserServiceImpl {
    pub fn new(db: Arc<dyn UserDb>, pepper: impl Into<String>) -> Self {
        Self {
            db,
            pepper: pepper.into(),
        }
    }
}

/// Stack service → validator → `db`.
pub fn user_service(db: Arc<dyn UserDb>, auth: &AuthConfig) -> UserServiceImpl {
    let validator = UserValidator::new(db, auth);
    UserServiceImpl::new(Arc::new(validator), auth.pepper.clone())
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let found = self.db.by_email(email).await?;

        let verified = spawn_verify_password(
            password.to_string(),
            self.pepper.clone(),
            found.password_hash.clone(),
        )
        .await;
        match verified {
            Ok(true) => Ok(found),
            Ok(false) => {
                warn!(user_id = found.id, "authenticate: incorrect password");
                Err(ModelError::PasswordIncorrect)
            }
            Err(e) => {
                error!(error = %e, user_id = found.id, "authenticate: stored hash unusable");
                Err(ModelError::Internal(e))
            }
        }
    }
}

#[async_trait]
impl UserDb for UserServiceImpl {
    async fn by_id(&self, id: i64) -> Result<User> {
        self.db.by_id(id).await
    }

    async fn by_email(&self, email: &str) -> Result<User> {
        self.db.by_email(email).await
    }

    async fn by_remember(&self, token: &str) -> Result<User> {
        self.db.by_remember(token).await
    }

    async fn create(&self, user: &mut User) -> Result<()> {
        self.db.create(user).await
    }

    async fn update(&self, user: &mut User) -> Result<()> {
        self.db.update(user).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.db.delete(id).await
    }
}
