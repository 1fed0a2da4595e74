use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::auth::hash::Hmac;
use crate::auth::password::spawn_hash_password;
use crate::auth::repo::UserDb;
use crate::auth::repo_types::User;
use crate::auth::token;
use crate::config::AuthConfig;
use crate::errors::{ModelError, Result};

pub const MIN_PASSWORD_LEN: usize = 8;

/// One step of a validation pipeline. Steps may normalize the user in place.
type UserValFn = fn(&UserValidator, &mut User) -> Result<()>;

/// Run `fns` in order, stopping at the first error.
fn run_user_val_fns(uv: &UserValidator, user: &mut User, fns: &[UserValFn]) -> Result<()> {
    fns.iter().try_for_each(|f| f(uv, user))
}

// Checks on the plaintext password, run before it is hashed.
const CREATE_CHECKS: &[UserValFn] = &[
    UserValidator::password_required,
    UserValidator::password_min_length,
];

// Run after hashing. Later steps depend on earlier ones: the remember hash
// needs a token, email checks need the normalized address.
const CREATE_STEPS: &[UserValFn] = &[
    UserValidator::password_hash_required,
    UserValidator::set_remember_if_unset,
    UserValidator::remember_min_bytes,
    UserValidator::hmac_remember,
    UserValidator::remember_hash_required,
    UserValidator::normalize_email,
    UserValidator::require_email,
    UserValidator::email_format,
];

const UPDATE_CHECKS: &[UserValFn] = &[UserValidator::password_min_length];

const UPDATE_STEPS: &[UserValFn] = &[
    UserValidator::password_hash_required,
    UserValidator::remember_min_bytes,
    UserValidator::hmac_remember,
    UserValidator::remember_hash_required,
    UserValidator::normalize_email,
    UserValidator::require_email,
    UserValidator::email_format,
];

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,16}$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Validation and normalization layer in front of another [`UserDb`].
pub struct UserValidator {
    db: Arc<dyn UserDb>,
    hmac: Hmac,
    pepper: String,
}

impl UserValidator {
    pub fn new(db: Arc<dyn UserDb>, auth: &AuthConfig) -> Self {
        Self {
            db,
            hmac: Hmac::new(&auth.hmac_key),
            pepper: auth.pepper.clone(),
        }
    }

    fn password_required(&self, user: &mut User) -> Result<()> {
        if user.password.is_empty() {
            return Err(ModelError::PasswordRequired);
        }
        Ok(())
    }

    fn password_min_length(&self, user: &mut User) -> Result<()> {
        // Not supplied on update: the stored hash stays.
        if user.password.is_empty() {
            return Ok(());
        }
        if user.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ModelError::PasswordTooShort);
        }
        Ok(())
    }

    /// Replace the plaintext password with its hash. Runs on the blocking pool.
    async fn hash_password(&self, user: &mut User) -> Result<()> {
        if user.password.is_empty() {
            return Ok(());
        }
        user.password_hash =
            spawn_hash_password(user.password.clone(), self.pepper.clone()).await?;
        user.password.clear();
        Ok(())
    }

    fn password_hash_required(&self, user: &mut User) -> Result<()> {
        if user.password_hash.is_empty() {
            return Err(ModelError::PasswordRequired);
        }
        Ok(())
    }

    fn set_remember_if_unset(&self, user: &mut User) -> Result<()> {
        if !user.remember.is_empty() {
            return Ok(());
        }
        user.remember = token::remember_token()?;
        Ok(())
    }

    fn remember_min_bytes(&self, user: &mut User) -> Result<()> {
        if user.remember.is_empty() {
            return Ok(());
        }
        // A token that is not valid base64 cannot prove its entropy either.
        match token::n_bytes(&user.remember) {
            Ok(n) if n >= token::REMEMBER_TOKEN_BYTES => Ok(()),
            _ => Err(ModelError::RememberTooShort),
        }
    }

    fn hmac_remember(&self, user: &mut User) -> Result<()> {
        if user.remember.is_empty() {
            return Ok(());
        }
        user.remember_hash = self.hmac.hash(&user.remember);
        Ok(())
    }

    fn remember_hash_required(&self, user: &mut User) -> Result<()> {
        if user.remember_hash.is_empty() {
            return Err(ModelError::RememberRequired);
        }
        Ok(())
    }

    fn normalize_email(&self, user: &mut User) -> Result<()> {
        user.email = normalize_email(&user.email);
        Ok(())
    }

    fn require_email(&self, user: &mut User) -> Result<()> {
        if user.email.is_empty() {
            return Err(ModelError::EmailRequired);
        }
        Ok(())
    }

    fn email_format(&self, user: &mut User) -> Result<()> {
        if !is_valid_email(&user.email) {
            return Err(ModelError::EmailInvalid);
        }
        Ok(())
    }

    fn id_greater_than_zero(&self, user: &mut User) -> Result<()> {
        if user.id <= 0 {
            return Err(ModelError::InvalidId);
        }
        Ok(())
    }

    /// Fails with `EmailTaken` when a different user owns `user.email`.
    ///
    /// Check-then-act: the unique index on `users.email` catches the races.
    async fn email_is_avail(&self, user: &User) -> Result<()> {
        match self.db.by_email(&user.email).await {
            Ok(existing) if existing.id != user.id => Err(ModelError::EmailTaken),
            Ok(_) => Ok(()),
            Err(ModelError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `checks`, then the password hash, then `steps`, then email availability.
    async fn validate(
        &self,
        user: &mut User,
        checks: &[UserValFn],
        steps: &[UserValFn],
    ) -> Result<()> {
        run_user_val_fns(self, user, checks)?;
        self.hash_password(user).await?;
        run_user_val_fns(self, user, steps)?;
        self.email_is_avail(user).await
    }
}

/// Lower-case and trim an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserDb for UserValidator {
    async fn by_id(&self, id: i64) -> Result<User> {
        let mut user = User {
            id,
            ..Default::default()
        };
        run_user_val_fns(self, &mut user, &[Self::id_greater_than_zero])?;
        self.db.by_id(id).await
    }

    async fn by_email(&self, email: &str) -> Result<User> {
        let mut user = User {
            email: email.to_string(),
            ..Default::default()
        };
        run_user_val_fns(self, &mut user, &[Self::normalize_email])?;
        self.db.by_email(&user.email).await
    }

    /// Hash the plaintext `token` and look the user up by the hash.
    async fn by_remember(&self, token: &str) -> Result<User> {
        let mut user = User {
            remember: token.to_string(),
            ..Default::default()
        };
        run_user_val_fns(self, &mut user, &[Self::hmac_remember])?;
        self.db.by_remember(&user.remember_hash).await
    }

    async fn create(&self, user: &mut User) -> Result<()> {
        if let Err(e) = self.validate(user, CREATE_CHECKS, CREATE_STEPS).await {
            debug!(kind = %e.kind(), "user create rejected");
            return Err(e);
        }
        self.db.create(user).await
    }

    async fn update(&self, user: &mut User) -> Result<()> {
        if let Err(e) = self.validate(user, UPDATE_CHECKS, UPDATE_STEPS).await {
            debug!(kind = %e.kind(), user_id = user.id, "user update rejected");
            return Err(e);
        }
        self.db.update(user).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut user = User {
            id,
            ..Default::default()
        };
        run_user_val_fns(self, &mut user, &[Self::id_greater_than_zero])?;
        self.db.delete(id).await
    }
}
