//! HTTP handlers for Categories API

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    PageQuery, Pagination, QueryParams, UuidPath, ValidatedJson,
};
use domain_products::Product;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::CategoryResult;
use crate::models::{
    Category, CategoryFilter, CreateCategory, MessageResponse, ProductAssignment, UpdateCategory,
};
use crate::repository::CategoryRepository;
use crate::service::CategoryService;

/// OpenAPI documentation for Categories API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_categories,
        create_category,
        search_categories,
        filter_categories,
        assign_product,
        remove_product,
        get_category,
        update_category,
        delete_category,
        products_in_category,
        category_hierarchy,
        subcategories,
    ),
    components(
        schemas(
            Category, CreateCategory, UpdateCategory, CategoryFilter,
            ProductAssignment, MessageResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Categories", description = "Category tree and product assignment endpoints")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the category routes nested under `/products`
#[derive(OpenApi)]
#[openapi(
    paths(categories_for_product),
    components(schemas(Category)),
    tags(
        (name = "Categories", description = "Category tree and product assignment endpoints")
    )
)]
pub struct ProductCategoriesApiDoc;

/// Routes mounted under `/categories`
pub fn router<R: CategoryRepository + 'static>(service: CategoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/search", get(search_categories))
        .route("/filter", get(filter_categories))
        .route("/assign-product", post(assign_product))
        .route("/remove-product", post(remove_product))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/{id}/products", get(products_in_category))
        .route("/{id}/hierarchy", get(category_hierarchy))
        .route("/{id}/subcategories", get(subcategories))
        .with_state(shared_service)
}

/// `/{id}/categories`, merged into the products router
pub fn product_categories_router<R: CategoryRepository + 'static>(
    service: CategoryService<R>,
) -> Router {
    Router::new()
        .route("/{id}/categories", get(categories_for_product))
        .with_state(Arc::new(service))
}

/// List categories, one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = "Categories",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    QueryParams(page): QueryParams<PageQuery>,
) -> CategoryResult<Json<Vec<Category>>> {
    let categories = service.list_categories(Pagination::from(&page)).await?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "",
    tag = "Categories",
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CategoryResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring; must not be blank
    #[serde(default)]
    pub q: String,
}

/// Search categories by name or description
#[utoipa::path(
    get,
    path = "/search",
    tag = "Categories",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Search results", body = Vec<Category>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    QueryParams(query): QueryParams<SearchQuery>,
    QueryParams(page): QueryParams<PageQuery>,
) -> CategoryResult<Json<Vec<Category>>> {
    let categories = service
        .search_categories(&query.q, Pagination::from(&page))
        .await?;
    Ok(Json(categories))
}

/// Filter categories by name, parent or root status
#[utoipa::path(
    get,
    path = "/filter",
    tag = "Categories",
    params(CategoryFilter, PageQuery),
    responses(
        (status = 200, description = "Matching categories", body = Vec<Category>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn filter_categories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    QueryParams(filter): QueryParams<CategoryFilter>,
    QueryParams(page): QueryParams<PageQuery>,
) -> CategoryResult<Json<Vec<Category>>> {
    let categories = service
        .filter_categories(filter, Pagination::from(&page))
        .await?;
    Ok(Json(categories))
}

/// Link a product and a category on both sides
#[utoipa::path(
    post,
    path = "/assign-product",
    tag = "Categories",
    request_body = ProductAssignment,
    responses(
        (status = 200, description = "Product assigned", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn assign_product<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<ProductAssignment>,
) -> CategoryResult<Json<MessageResponse>> {
    service
        .assign_product(input.product_id, input.category_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Product assigned to category successfully".to_string(),
    }))
}

/// Unlink a product and a category on both sides
#[utoipa::path(
    post,
    path = "/remove-product",
    tag = "Categories",
    request_body = ProductAssignment,
    responses(
        (status = 200, description = "Product removed", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_product<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    ValidatedJson(input): ValidatedJson<ProductAssignment>,
) -> CategoryResult<Json<MessageResponse>> {
    service
        .remove_product(input.product_id, input.category_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Product removed from category successfully".to_string(),
    }))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.get_category(id).await?))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> CategoryResult<Json<Category>> {
    Ok(Json(service.update_category(id, input).await?))
}

/// Delete a category. Children keep their `parent_id`, and products keep the id in
/// their `categories` set.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<impl IntoResponse> {
    service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Products assigned to a category
#[utoipa::path(
    get,
    path = "/{id}/products",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Products in category", body = Vec<Product>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn products_in_category<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Vec<Product>>> {
    Ok(Json(service.products_in_category(id).await?))
}

/// Ancestors of a category, root first, ending with the category itself
#[utoipa::path(
    get,
    path = "/{id}/hierarchy",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Root-first path", body = Vec<Category>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn category_hierarchy<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Vec<Category>>> {
    Ok(Json(service.hierarchy(id).await?))
}

/// Direct children of a category
#[utoipa::path(
    get,
    path = "/{id}/subcategories",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Parent category ID")),
    responses(
        (status = 200, description = "Child categories", body = Vec<Category>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn subcategories<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Vec<Category>>> {
    Ok(Json(service.subcategories(id).await?))
}

/// Primary and secondary categories of a product
#[utoipa::path(
    get,
    path = "/{id}/categories",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Categories of the product", body = Vec<Category>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn categories_for_product<R: CategoryRepository>(
    State(service): State<Arc<CategoryService<R>>>,
    UuidPath(id): UuidPath,
) -> CategoryResult<Json<Vec<Category>>> {
    Ok(Json(service.categories_for_product(id).await?))
}
