use serde::Deserialize;

/// Request body for creating a gallery.
#[derive(Debug, Deserialize)]
pub struct GalleryForm {
    #[serde(default)]
    pub title: String,
}
