use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found: {0}")]
    NotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Category with name '{0}' already exists")]
    DuplicateName(String),

    /// The parent chain revisits a category.
    #[error("Cycle detected in category hierarchy at {0}")]
    CycleDetected(Uuid),

    #[error("{0}")]
    Validation(String),

    /// The product side of an assign/remove was written but the category side
    /// failed. The link is left one-directional.
    #[error(
        "product {product_id} updated but category {category_id} was not: {message}"
    )]
    PartialLink {
        product_id: Uuid,
        category_id: Uuid,
        message: String,
    },

    #[error("{0}")]
    Database(String),
}

pub type CategoryResult<T> = Result<T, CategoryError>;

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::NotFound(id) => AppError::NotFound(format!("Category {} not found", id)),
            CategoryError::ProductNotFound(id) => {
                AppError::NotFound(format!("Product {} not found", id))
            }
            CategoryError::DuplicateName(name) => {
                AppError::Conflict(format!("Category with name '{}' already exists", name))
            }
            err @ CategoryError::CycleDetected(_) => AppError::Conflict(err.to_string()),
            CategoryError::Validation(msg) => AppError::BadRequest(msg),
            err @ CategoryError::PartialLink { .. } => AppError::Database(err.to_string()),
            CategoryError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CategoryError {
    fn from(err: mongodb::error::Error) -> Self {
        CategoryError::Database(err.to_string())
    }
}
