use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

pub type Result<T, E = ModelError> = std::result::Result<T, E>;

/// Shown to the client in place of any internal failure.
pub const ALERT_MSG_GENERIC: &str =
    "Something went wrong. Please try again, and contact us if the problem persists.";

/// Shown for both an unknown email and a wrong password on login.
pub const ALERT_MSG_INVALID_CREDENTIALS: &str = "Invalid email address or password.";

/// Errors produced by the model layers (persistence, validation, services).
///
/// Every variant except `Internal` is a public, user-facing condition and is
/// passed through to the client as is.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Resource not found.")]
    NotFound,
    #[error("ID provided was invalid.")]
    InvalidId,
    #[error("Password is required.")]
    PasswordRequired,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Incorrect password provided.")]
    PasswordIncorrect,
    #[error("Email address is required.")]
    EmailRequired,
    #[error("Email address is not valid.")]
    EmailInvalid,
    #[error("Email address is already taken.")]
    EmailTaken,
    #[error("Remember token is required.")]
    RememberRequired,
    #[error("Remember token must be at least 32 bytes.")]
    RememberTooShort,
    #[error("Title is required.")]
    TitleRequired,
    #[error("User ID is required.")]
    UserIdRequired,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Stable identifier for each [`ModelError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidId,
    PasswordRequired,
    PasswordTooShort,
    PasswordIncorrect,
    EmailRequired,
    EmailInvalid,
    EmailTaken,
    RememberRequired,
    RememberTooShort,
    TitleRequired,
    UserIdRequired,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::InvalidId => "id-invalid",
            ErrorKind::PasswordRequired => "password-required",
            ErrorKind::PasswordTooShort => "password-too-short",
            ErrorKind::PasswordIncorrect => "password-incorrect",
            ErrorKind::EmailRequired => "email-required",
            ErrorKind::EmailInvalid => "email-invalid",
            ErrorKind::EmailTaken => "email-taken",
            ErrorKind::RememberRequired => "remember-required",
            ErrorKind::RememberTooShort => "remember-too-short",
            ErrorKind::TitleRequired => "title-required",
            ErrorKind::UserIdRequired => "user-id-required",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::NotFound => ErrorKind::NotFound,
            ModelError::InvalidId => ErrorKind::InvalidId,
            ModelError::PasswordRequired => ErrorKind::PasswordRequired,
            ModelError::PasswordTooShort => ErrorKind::PasswordTooShort,
            ModelError::PasswordIncorrect => ErrorKind::PasswordIncorrect,
            ModelError::EmailRequired => ErrorKind::EmailRequired,
            ModelError::EmailInvalid => ErrorKind::EmailInvalid,
            ModelError::EmailTaken => ErrorKind::EmailTaken,
            ModelError::RememberRequired => ErrorKind::RememberRequired,
            ModelError::RememberTooShort => ErrorKind::RememberTooShort,
            ModelError::TitleRequired => ErrorKind::TitleRequired,
            ModelError::UserIdRequired => ErrorKind::UserIdRequired,
            ModelError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }

    /// Message safe to show to an end user.
    pub fn public(&self) -> String {
        match self {
            ModelError::Internal(_) => ALERT_MSG_GENERIC.to_string(),
            other => other.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PasswordIncorrect => StatusCode::UNAUTHORIZED,
            ErrorKind::EmailTaken => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

pub const ALERT_LVL_ERROR: &str = "danger";

/// Error body rendered to the client.
#[derive(Debug, Serialize)]
pub struct Alert {
    pub level: &'static str,
    pub kind: &'static str,
    pub message: String,
}

impl Alert {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            level: ALERT_LVL_ERROR,
            kind: kind.as_str(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ModelError {
    fn into_response(self) -> Response {
        if let ModelError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let alert = Alert::error(self.kind(), self.public());
        (self.status(), Json(alert)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_identifiers_are_stable() {
        assert_eq!(ModelError::NotFound.kind().as_str(), "not-found");
        assert_eq!(ModelError::InvalidId.kind().as_str(), "id-invalid");
        assert_eq!(ModelError::EmailTaken.kind().to_string(), "email-taken");
        assert_eq!(
            ModelError::Internal(anyhow::anyhow!("boom")).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn is_matches_only_its_own_kind() {
        let err = ModelError::PasswordTooShort;
        assert!(err.is(ErrorKind::PasswordTooShort));
        assert!(!err.is(ErrorKind::PasswordRequired));
    }

    #[test]
    fn internal_errors_are_hidden_from_users() {
        let err = ModelError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"));
        assert_eq!(err.public(), ALERT_MSG_GENERIC);
        assert!(!err.public().contains("10.0.0.3"));
    }

    #[test]
    fn validation_errors_keep_their_message() {
        assert_eq!(ModelError::EmailInvalid.public(), "Email address is not valid.");
    }

    #[test]
    fn status_codes_follow_kind() {
        assert_eq!(ModelError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ModelError::EmailTaken.status(), StatusCode::CONFLICT);
        assert_eq!(ModelError::TitleRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ModelError::Internal(anyhow::anyhow!("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn alert_serializes_kind_and_message() {
        let alert = Alert::error(ErrorKind::EmailRequired, "Email address is required.");
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"kind\":\"email-required\""));
        assert!(json.contains("danger"));
    }
}
