use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Product with name '{0}' already exists")]
    DuplicateName(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::DuplicateName(name) => {
                AppError::Conflict(format!("Product with name '{}' already exists", name))
            }
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProductError::NotFound(Uuid::now_v7()), StatusCode::NOT_FOUND),
            (ProductError::DuplicateName("Lamp".into()), StatusCode::CONFLICT),
            (ProductError::Validation("name is required".into()), StatusCode::BAD_REQUEST),
            (
                ProductError::Database("E11000 duplicate key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = ProductError::Validation("search query cannot be empty".into());
        assert_eq!(err.to_string(), "search query cannot be empty");
    }
}
