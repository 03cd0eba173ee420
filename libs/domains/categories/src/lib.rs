//! Categories Domain
//!
//! Category tree, product/category links and the HTTP API over MongoDB.
//!
//! The category store reads and writes the `products` collection as well as
//! `categories`, because links are kept on both documents:
//!
//! ```text
//! products.categories   ──▶ [category ids]
//! categories.product_ids ──▶ [product ids]
//! ```
//!
//! Assign and remove write both sides one after the other with no transaction.
//! See [`CategoryRepository::assign_product`].

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CategoryError, CategoryResult};
pub use handlers::{ApiDoc, ProductCategoriesApiDoc};
pub use models::{
    Category, CategoryFilter, CreateCategory, MessageResponse, ProductAssignment, UpdateCategory,
};
pub use mongodb::MongoCategoryRepository;
pub use repository::{CategoryRepository, InMemoryCategoryRepository};
pub use service::CategoryService;
