use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::{map_lookup_err, map_write_err};
use crate::errors::Result;
use crate::galleries::repo_types::Gallery;

/// Storage capability for galleries.
#[async_trait]
pub trait GalleryDb: Send + Sync {
    async fn by_id(&self, id: i64) -> Result<Gallery>;
    async fn create(&self, gallery: &mut Gallery) -> Result<()>;
}

#[derive(Clone)]
pub struct PgGalleryDb {
    db: PgPool,
}

impl PgGalleryDb {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GalleryDb for PgGalleryDb {
    async fn by_id(&self, id: i64) -> Result<Gallery> {
        sqlx::query_as::<_, Gallery>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM galleries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_lookup_err(e, "gallery by id"))
    }

    async fn create(&self, gallery: &mut Gallery) -> Result<()> {
        let (id, created_at, updated_at) = sqlx::query_as::<_, (i64, OffsetDateTime, OffsetDateTime)>(
            r#"
            INSERT INTO galleries (user_id, title)
            VALUES ($1, $2)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(gallery.user_id)
        .bind(&gallery.title)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_err(e, "create gallery"))?;

        gallery.id = id;
        gallery.created_at = Some(created_at);
        gallery.updated_at = Some(updated_at);
        Ok(())
    }
}
