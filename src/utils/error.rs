use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures of the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(mongodb::error::Error),
    #[error("duplicate key")]
    DuplicateKey,
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("no record with id {0}")]
    RecordMissing(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateKey
        } else {
            StoreError::Database(err)
        }
    }
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Outcomes of the session/token flow.
///
/// The first five variants are caller-facing and recoverable. The rest wrap
/// infrastructure faults and are reported as a generic 500.
#[derive(Debug, Error)]
pub enum AuthFailure {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Refresh token not found")]
    TokenNotFound,
    #[error("Invalid or expired token")]
    TokenInvalid,
    #[error("Email already registered")]
    DuplicateRegistration,
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl AuthFailure {
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthFailure::Store(_) | AuthFailure::Hashing(_) | AuthFailure::Signing(_)
        )
    }

    /// Message safe to hand back to the client.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for AuthFailure {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthFailure::InvalidCredentials | AuthFailure::TokenNotFound | AuthFailure::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AuthFailure::DuplicateRegistration => StatusCode::CONFLICT,
            AuthFailure::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AuthFailure::Store(_) | AuthFailure::Hashing(_) | AuthFailure::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.public_message()
        }))
    }
}

/// Errors of the organization endpoints.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::DatabaseError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": message
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_status_codes() {
        assert_eq!(AuthFailure::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthFailure::TokenNotFound.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthFailure::TokenInvalid.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthFailure::DuplicateRegistration.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthFailure::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthFailure::Hashing("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let failure = AuthFailure::Store(StoreError::InvalidId("xyz".into()));
        assert!(failure.is_internal());
        assert_eq!(failure.public_message(), "Internal server error");
        assert_eq!(AuthFailure::InvalidCredentials.public_message(), "Invalid credentials");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::NotFound("org".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidRequest("id".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DatabaseError("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
