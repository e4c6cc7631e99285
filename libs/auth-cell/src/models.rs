use serde::Deserialize;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;
use shared_utils::ValidationError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    /// `PATIENT`, `DOCTOR` or `ADMIN`, any case.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Same message whether the user is unknown or the password is wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::InvalidArgument(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Hashing(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidArgument(msg) => AppError::ValidationError(msg),
            AuthError::UsernameTaken(_) => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::Store(StoreError::Conflict(msg)) => AppError::Conflict(msg),
            AuthError::Store(e) => AppError::Database(e.to_string()),
        }
    }
}
