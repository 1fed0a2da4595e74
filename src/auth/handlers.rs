use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest},
        extractors::{remember_cookie, CurrentUser},
        repo_types::User,
        token,
    },
    errors::{Alert, ErrorKind, ModelError, ALERT_MSG_INVALID_CREDENTIALS},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<PublicUser>), ModelError> {
    let mut user = User::new(payload.name, payload.email, payload.password);
    if let Err(e) = state.services.user.create(&mut user).await {
        warn!(kind = %e.kind(), "signup rejected");
        return Err(e);
    }

    let headers = sign_in(&state, &mut user).await?;
    info!(user_id = user.id, "user signed up");
    Ok((StatusCode::CREATED, headers, Json(PublicUser::from(&user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<PublicUser>), Response> {
    let mut user = match state
        .services
        .user
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(u) => u,
        Err(e @ (ModelError::NotFound | ModelError::PasswordIncorrect)) => {
            warn!(kind = %e.kind(), "login failed");
            return Err(invalid_credentials());
        }
        Err(e) => return Err(e.into_response()),
    };

    let headers = sign_in(&state, &mut user)
        .await
        .map_err(IntoResponse::into_response)?;
    info!(user_id = user.id, "user logged in");
    Ok((headers, Json(PublicUser::from(&user))))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

/// Make sure the user has a remember token and hand it out as a cookie.
///
/// A fresh token is issued (and its hash stored) when the user has none in
/// memory, which is every login.
async fn sign_in(state: &AppState, user: &mut User) -> Result<HeaderMap, ModelError> {
    if user.remember.is_empty() {
        user.remember = token::remember_token()?;
        state.services.user.update(user).await?;
    }
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, remember_cookie(&user.remember)?);
    Ok(headers)
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(Alert::error(
            ErrorKind::PasswordIncorrect,
            ALERT_MSG_INVALID_CREDENTIALS,
        )),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_secrets() {
        let mut user = User::new("Jon", "jon@example.com", "password123");
        user.id = 7;
        user.password_hash = "hash".into();
        user.remember = "token".into();

        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains("jon@example.com"));
        assert!(!json.contains("password123"));
        assert!(!json.contains("hash"));
        assert!(!json.contains("token"));
    }

    #[test]
    fn invalid_credentials_is_unauthorized() {
        let res = invalid_credentials();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    fn cookie_pair(headers: &HeaderMap) -> String {
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn current_user(state: &AppState, cookie: &str) -> Option<User> {
        use axum::extract::FromRequestParts;

        let (mut parts, _) = axum::http::Request::builder()
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap()
            .into_parts();
        CurrentUser::from_request_parts(&mut parts, state)
            .await
            .ok()
            .map(|CurrentUser(u)| u)
    }

    fn signup_request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: "Jon Calhoun".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn signup_sets_remember_cookie() {
        let state = AppState::fake();
        let (status, headers, Json(public)) = signup(
            State(state.clone()),
            Json(signup_request(" Jon@Example.com", "password123")),
        )
        .await
        .expect("signup");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(public.email, "jon@example.com");

        let cookie = cookie_pair(&headers);
        let me = current_user(&state, &cookie).await.expect("cookie resolves");
        assert_eq!(me.id, public.id);
    }

    #[tokio::test]
    async fn signup_rejects_short_password() {
        let state = AppState::fake();
        let err = signup(
            State(state),
            Json(signup_request("jon@example.com", "short")),
        )
        .await
        .unwrap_err();
        assert!(err.is(ErrorKind::PasswordTooShort));
    }

    #[tokio::test]
    async fn login_rotates_remember_token() {
        let state = AppState::fake();
        let (_, signup_headers, _) = signup(
            State(state.clone()),
            Json(signup_request("jon@example.com", "password123")),
        )
        .await
        .unwrap();
        let old_cookie = cookie_pair(&signup_headers);

        let (headers, Json(public)) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "JON@example.com ".into(),
                password: "password123".into(),
            }),
        )
        .await
        .expect("login");
        let new_cookie = cookie_pair(&headers);

        assert_ne!(old_cookie, new_cookie);
        assert!(current_user(&state, &old_cookie).await.is_none());
        let me = current_user(&state, &new_cookie).await.unwrap();
        assert_eq!(me.id, public.id);
    }

    #[tokio::test]
    async fn login_failures_look_the_same() {
        let state = AppState::fake();
        let _created = signup(
            State(state.clone()),
            Json(signup_request("jon@example.com", "password123")),
        )
        .await
        .expect("signup");

        let wrong_password = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "jon@example.com".into(),
                password: "password124".into(),
            }),
        )
        .await
        .unwrap_err();
        let unknown_email = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "nobody@example.com".into(),
                password: "password123".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), wrong_password.status());
    }

    #[tokio::test]
    async fn unknown_cookie_is_rejected() {
        let state = AppState::fake();
        assert!(current_user(&state, "remember_token=bogus").await.is_none());
        assert!(current_user(&state, "theme=dark").await.is_none());
    }
}
