use async_graphql::ErrorExtensions;
use axum_helpers::{ErrorCode, TokenError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user {0} not found")]
    NotFound(Uuid),

    #[error("user with email {0} not found")]
    EmailNotFound(String),

    #[error("user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Driver-level failure, passed through verbatim.
    #[error("{0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::NotFound(_) | UserError::EmailNotFound(_) => ErrorCode::NotFound,
            UserError::DuplicateEmail(_) => ErrorCode::Conflict,
            UserError::InvalidCredentials | UserError::Token(_) => ErrorCode::Unauthorized,
            UserError::Validation(_) => ErrorCode::ValidationError,
            UserError::PasswordHash(_) => ErrorCode::InternalError,
            UserError::Database(_) => ErrorCode::DatabaseError,
        }
    }
}

/// GraphQL errors carry the domain message plus a `code` extension.
impl ErrorExtensions for UserError {
    fn extend(&self) -> async_graphql::Error {
        if matches!(self, UserError::PasswordHash(_) | UserError::Database(_)) {
            tracing::error!(error = %self, error_code = self.code().code(), "user operation failed");
        }

        async_graphql::Error::new(self.to_string())
            .extend_with(|_, e| e.set("code", self.code().as_str()))
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UserError::Validation(errors.to_string())
    }
}
