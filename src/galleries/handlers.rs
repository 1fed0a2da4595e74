use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::CurrentUser,
    errors::ModelError,
    galleries::{dto::GalleryForm, repo_types::Gallery},
    state::AppState,
};

pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/galleries", post(create_gallery))
        .route("/galleries/:id", get(show_gallery))
}

#[instrument(skip(state, user, form))]
pub async fn create_gallery(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<GalleryForm>,
) -> Result<(StatusCode, HeaderMap, Json<Gallery>), ModelError> {
    let mut gallery = Gallery {
        user_id: user.id,
        title: form.title,
        ..Default::default()
    };
    if let Err(e) = state.services.gallery.create(&mut gallery).await {
        warn!(kind = %e.kind(), user_id = user.id, "gallery create rejected");
        return Err(e);
    }

    let mut headers = HeaderMap::new();
    let location = format!("/api/v1/galleries/{}", gallery.id)
        .parse::<HeaderValue>()
        .map_err(|e| ModelError::Internal(anyhow::anyhow!("location header: {e}")))?;
    headers.insert(header::LOCATION, location);

    info!(gallery_id = gallery.id, user_id = user.id, "gallery created");
    Ok((StatusCode::CREATED, headers, Json(gallery)))
}

#[instrument(skip(state))]
pub async fn show_gallery(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Gallery>, ModelError> {
    Ok(Json(state.services.gallery.by_id(id).await?))
}
