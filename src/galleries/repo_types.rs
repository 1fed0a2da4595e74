use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Gallery record, owned by a single user.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct Gallery {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}
