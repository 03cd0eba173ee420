//! API routes module

pub mod health;

use axum::Router;
use domain_categories::{CategoryRepository, CategoryService, MongoCategoryRepository};
use domain_products::{MongoProductRepository, ProductRepository, ProductService};

use crate::state::AppState;

/// Versioned routes, mounted by `create_router` under `/api`
pub fn routes(state: &AppState) -> Router {
    v1(
        ProductService::new(MongoProductRepository::new(&state.db)),
        CategoryService::new(MongoCategoryRepository::new(&state.db)),
    )
}

/// `/v1/products` and `/v1/categories` for any pair of stores
pub fn v1<P, C>(products: ProductService<P>, categories: CategoryService<C>) -> Router
where
    P: ProductRepository + 'static,
    C: CategoryRepository + 'static,
{
    let product_routes = domain_products::handlers::router(products)
        .merge(domain_categories::handlers::product_categories_router(categories.clone()));

    Router::new()
        .nest("/v1/products", product_routes)
        .nest("/v1/categories", domain_categories::handlers::router(categories))
}

/// Create the unique name indexes on both collections
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoProductRepository::new(&state.db).init_indexes().await?;
    MongoCategoryRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
