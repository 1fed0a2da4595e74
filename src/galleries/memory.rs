use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{ModelError, Result};
use crate::galleries::repo::GalleryDb;
use crate::galleries::repo_types::Gallery;

#[derive(Default)]
pub struct MemoryGalleryDb {
    galleries: Mutex<Vec<Gallery>>,
}

impl MemoryGalleryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.galleries.lock().unwrap().len()
    }
}

#[async_trait]
impl GalleryDb for MemoryGalleryDb {
    async fn by_id(&self, id: i64) -> Result<Gallery> {
        self.galleries
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or(ModelError::NotFound)
    }

    async fn create(&self, gallery: &mut Gallery) -> Result<()> {
        let mut galleries = self.galleries.lock().unwrap();
        gallery.id = galleries.len() as i64 + 1;
        galleries.push(gallery.clone());
        Ok(())
    }
}
