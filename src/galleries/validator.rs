use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{ModelError, Result};
use crate::galleries::repo::GalleryDb;
use crate::galleries::repo_types::Gallery;

type GalleryValFn = fn(&mut Gallery) -> Result<()>;

fn run_gallery_val_fns(gallery: &mut Gallery, fns: &[GalleryValFn]) -> Result<()> {
    fns.iter().try_for_each(|f| f(gallery))
}

fn user_id_required(g: &mut Gallery) -> Result<()> {
    if g.user_id <= 0 {
        return Err(ModelError::UserIdRequired);
    }
    Ok(())
}

fn title_required(g: &mut Gallery) -> Result<()> {
    g.title = g.title.trim().to_string();
    if g.title.is_empty() {
        return Err(ModelError::TitleRequired);
    }
    Ok(())
}

const CREATE_STEPS: &[GalleryValFn] = &[user_id_required, title_required];

pub struct GalleryValidator {
    db: Arc<dyn GalleryDb>,
}

impl GalleryValidator {
    pub fn new(db: Arc<dyn GalleryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GalleryDb for GalleryValidator {
    async fn by_id(&self, id: i64) -> Result<Gallery> {
        if id <= 0 {
            return Err(ModelError::InvalidId);
        }
        self.db.by_id(id).await
    }

    async fn create(&self, gallery: &mut Gallery) -> Result<()> {
        run_gallery_val_fns(gallery, CREATE_STEPS)?;
        self.db.create(gallery).await
    }
}
