use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record.
///
/// `password` and `remember` hold plaintext for the duration of a single
/// create/update/login and are never stored or serialized.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[sqlx(skip)]
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(skip)]
    #[serde(skip_serializing)]
    pub remember: String,
    #[serde(skip_serializing)]
    pub remember_hash: String,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }
}
