use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

use crate::auth::repo_types::User;
use crate::errors::{Alert, ErrorKind, ModelError};
use crate::state::AppState;

pub const REMEMBER_COOKIE: &str = "remember_token";

/// Signed-in user, resolved from the remember token cookie.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || {
            (
                StatusCode::UNAUTHORIZED,
                Json(Alert::error(ErrorKind::NotFound, "Please log in.")),
            )
                .into_response()
        };

        let token = cookie_value(&parts.headers, REMEMBER_COOKIE).ok_or_else(|| {
            debug!("missing remember token cookie");
            unauthorized()
        })?;

        match state.services.user.by_remember(&token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(ModelError::NotFound) => {
                warn!("unknown remember token");
                Err(unauthorized())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Value of the first cookie named `name` across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value carrying the remember token.
pub fn remember_cookie(token: &str) -> anyhow::Result<HeaderValue> {
    let cookie = format!("{REMEMBER_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    Ok(HeaderValue::from_str(&cookie)?)
}
