use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Product status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    /// Product is active and available for sale
    #[default]
    Active,
    /// Product is inactive/disabled
    Inactive,
    /// Product is out of stock
    OutOfStock,
    /// Product is discontinued
    Discontinued,
    /// Product is in draft state
    Draft,
}

/// Product entity - represents a product stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Product name, unique across the catalog
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Free-form discount label, e.g. "10%"
    #[serde(default)]
    pub discount: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews_count: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub dimensions: String,
    /// Primary category. The nil UUID means the product has none.
    #[serde(default)]
    pub category_id: Uuid,
    /// Secondary categories, maintained by category assignment
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[serde(default)]
    pub discount: String,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub rating: f64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub reviews_count: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub dimensions: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub status: ProductStatus,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating an existing product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub discount: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(range(min = 0))]
    pub reviews_count: Option<i32>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub dimensions: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<ProductStatus>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub tags: Option<Vec<String>>,
}

/// Optional criteria for `GET /products/filter`. Absent fields do not constrain.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Minimum price (inclusive)
    pub min_price: Option<f64>,
    /// Maximum price (inclusive)
    pub max_price: Option<f64>,
    /// Exact status match
    pub status: Option<ProductStatus>,
    /// Case-insensitive substring of the brand
    pub brand: Option<String>,
    /// Primary or secondary category membership
    pub category: Option<Uuid>,
    /// Only products with stock > 0
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.status.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.in_stock != Some(true)
    }

    /// In-process evaluation of the same predicate the MongoDB store builds.
    pub fn matches(&self, product: &Product) -> bool {
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.status.is_some_and(|status| product.status != status) {
            return false;
        }
        if let Some(ref brand) = self.brand {
            if !product
                .brand
                .to_lowercase()
                .contains(&brand.to_lowercase())
            {
                return false;
            }
        }
        if let Some(category) = self.category {
            if !product.belongs_to(category) {
                return false;
            }
        }
        if self.in_stock == Some(true) && product.stock <= 0 {
            return false;
        }
        true
    }
}

impl Product {
    /// Create a new product from CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            brand: input.brand,
            description: input.description,
            price: input.price,
            discount: input.discount,
            rating: input.rating,
            reviews_count: input.reviews_count,
            sizes: input.sizes,
            colors: input.colors,
            images: input.images,
            dimensions: input.dimensions,
            category_id: input.category_id.unwrap_or(Uuid::nil()),
            categories: input.categories,
            status: input.status,
            stock: input.stock,
            tags: input.tags,
            created_at: Utc::now(),
        }
    }

    /// Apply updates from UpdateProduct DTO
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(discount) = update.discount {
            self.discount = discount;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(reviews_count) = update.reviews_count {
            self.reviews_count = reviews_count;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(dimensions) = update.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
    }

    /// Primary category, if one is set
    pub fn primary_category(&self) -> Option<Uuid> {
        (!self.category_id.is_nil()).then_some(self.category_id)
    }

    pub fn belongs_to(&self, category_id: Uuid) -> bool {
        self.category_id == category_id || self.categories.contains(&category_id)
    }

    /// Case-insensitive substring match over name, description, brand and tags.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.brand.to_lowercase().contains(&needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}
