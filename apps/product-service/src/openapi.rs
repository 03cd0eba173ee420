//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the product service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Service",
        version = "0.1.0",
        description = "Product catalog and category tree API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/v1/products", api = domain_products::ApiDoc),
        (path = "/api/v1/products", api = domain_categories::ProductCategoriesApiDoc),
        (path = "/api/v1/categories", api = domain_categories::ApiDoc)
    ),
    tags(
        (name = "Products", description = "Product management endpoints"),
        (name = "Categories", description = "Category tree and product assignment endpoints")
    )
)]
pub struct ApiDoc;
