//! In-memory [`UserDb`] used by tests in place of postgres.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::repo::UserDb;
use crate::auth::repo_types::User;
use crate::db::fake_errors::unique_violation;
use crate::db::{map_lookup_err, map_write_err, USERS_EMAIL_KEY};
use crate::errors::{ModelError, Result};

#[derive(Default)]
pub struct MemoryUserDb {
    users: Mutex<Vec<User>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryUserDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of create/update/delete calls that reached this layer.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every later lookup fail the way a dropped connection does.
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Insert a row directly, bypassing every layer above.
    pub fn insert_raw(&self, mut user: User) -> User {
        user.id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.users.lock().unwrap().push(user.clone());
        user
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Result<User> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(map_lookup_err(sqlx::Error::PoolTimedOut, "user lookup"));
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| pred(u))
            .cloned()
            .ok_or(ModelError::NotFound)
    }

    // Mirrors the unique indexes on email and remember_hash, reporting
    // violations the way the postgres driver does.
    fn check_unique(users: &[User], user: &User) -> Result<()> {
        for other in users.iter().filter(|u| u.id != user.id) {
            if other.email == user.email {
                return Err(map_write_err(unique_violation(USERS_EMAIL_KEY), "write user"));
            }
            if other.remember_hash == user.remember_hash {
                return Err(map_write_err(
                    unique_violation("users_remember_hash_key"),
                    "write user",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserDb for MemoryUserDb {
    async fn by_id(&self, id: i64) -> Result<User> {
        self.find(|u| u.id == id)
    }

    async fn by_email(&self, email: &str) -> Result<User> {
        self.find(|u| u.email == email)
    }

    async fn by_remember(&self, remember_hash: &str) -> Result<User> {
        self.find(|u| u.remember_hash == remember_hash)
    }

    async fn create(&self, user: &mut User) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        let now = OffsetDateTime::now_utc();
        user.id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        user.created_at = Some(now);
        user.updated_at = Some(now);
        let mut stored = user.clone();
        stored.password.clear();
        stored.remember.clear();
        users.push(stored);
        Ok(())
    }

    async fn update(&self, user: &mut User) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        Self::check_unique(&users, user)?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(ModelError::NotFound)?;
        user.updated_at = Some(OffsetDateTime::now_utc());
        let mut stored = user.clone();
        stored.password.clear();
        stored.remember.clear();
        *slot = stored;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}
