use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::galleries::repo::GalleryDb;
use crate::galleries::repo_types::Gallery;
use crate::galleries::validator::GalleryValidator;

pub trait GalleryService: GalleryDb {}

pub struct GalleryServiceImpl {
    db: Arc<dyn GalleryDb>,
}

/// Stack service → validator → `db`.
pub fn gallery_service(db: Arc<dyn GalleryDb>) -> GalleryServiceImpl {
    GalleryServiceImpl {
        db: Arc::new(GalleryValidator::new(db)),
    }
}

impl GalleryService for GalleryServiceImpl {}

#[async_trait]
impl GalleryDb for GalleryServiceImpl {
    async fn by_id(&self, id: i64) -> Result<Gallery> {
        self.db.by_id(id).await
    }

    async fn create(&self, gallery: &mut Gallery) -> Result<()> {
        self.db.create(gallery).await
    }
}
