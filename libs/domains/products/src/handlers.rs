//! REST surface of the product catalog

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    PageQuery, Pagination, QueryParams, UuidPath, ValidatedJson,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductFilter, ProductStatus, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

type Catalog<R> = State<Arc<ProductService<R>>>;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        search_products,
        filter_products,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, ProductFilter, ProductStatus),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/products`.
///
/// `GET /{id}/categories` needs the category store, so the categories crate
/// provides it and the app merges it in.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/filter", get(filter_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(Arc::new(service))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring; must not be blank
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of the catalog", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(catalog): Catalog<R>,
    QueryParams(page): QueryParams<PageQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    catalog.list_products(Pagination::from(&page)).await.map(Json)
}

#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Stored product with its generated id", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(catalog): Catalog<R>,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<(StatusCode, Json<Product>)> {
    let created = catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Matches `q` against name, description, brand and tags
#[utoipa::path(
    get,
    path = "/search",
    tag = "Products",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "One page of matches", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_products<R: ProductRepository>(
    State(catalog): Catalog<R>,
    QueryParams(SearchQuery { q }): QueryParams<SearchQuery>,
    QueryParams(page): QueryParams<PageQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    catalog
        .search_products(&q, Pagination::from(&page))
        .await
        .map(Json)
}

/// Every criterion is optional; none at all lists the whole catalog
#[utoipa::path(
    get,
    path = "/filter",
    tag = "Products",
    params(ProductFilter, PageQuery),
    responses(
        (status = 200, description = "One page of matches", body = Vec<Product>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn filter_products<R: ProductRepository>(
    State(catalog): Catalog<R>,
    QueryParams(filter): QueryParams<ProductFilter>,
    QueryParams(page): QueryParams<PageQuery>,
) -> ProductResult<Json<Vec<Product>>> {
    catalog
        .filter_products(filter, Pagination::from(&page))
        .await
        .map(Json)
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(catalog): Catalog<R>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    catalog.get_product(id).await.map(Json)
}

/// Applies the fields present in the body and writes the whole record back
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Record after the update", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(catalog): Catalog<R>,
    UuidPath(id): UuidPath,
    ValidatedJson(changes): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    catalog.update_product(id, changes).await.map(Json)
}

/// Category link arrays that point at the product are left as they are
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product removed"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(catalog): Catalog<R>,
    UuidPath(id): UuidPath,
) -> ProductResult<StatusCode> {
    catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
