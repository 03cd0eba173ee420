use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Listing methods return the full result set in a stable order (oldest first);
/// paging happens in the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// List every product
    async fn list(&self) -> ProductResult<Vec<Product>>;

    /// List products matching every criterion present in `filter`
    async fn filter(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    /// Case-insensitive substring search over name, description, brand and tags
    async fn search(&self, query: &str) -> ProductResult<Vec<Product>>;

    /// Fetch, apply the partial update and write the full document back
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Delete a product by ID. Returns `NotFound` when nothing was removed.
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;

    /// Check if a product name exists
    async fn exists_by_name(&self, name: &str) -> ProductResult<bool>;
}

/// Product map shared between the in-memory product and category stores.
pub type SharedProducts = Arc<RwLock<HashMap<Uuid, Product>>>;

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: SharedProducts,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the underlying map, for stores that maintain product fields
    /// themselves (category assignment writes `Product::categories`).
    pub fn shared(&self) -> SharedProducts {
        Arc::clone(&self.products)
    }

    async fn sorted(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let products = self.products.read().await;
        let mut result: Vec<Product> = products.values().filter(|p| keep(p)).cloned().collect();
        // v7 ids sort by creation time
        result.sort_by_key(|p| p.id);
        result
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        if products.values().any(|p| p.name == input.name) {
            return Err(ProductError::DuplicateName(input.name));
        }

        let product = Product::new(input);
        products.insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(&self) -> ProductResult<Vec<Product>> {
        Ok(self.sorted(|_| true).await)
    }

    async fn filter(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        Ok(self.sorted(|p| filter.matches(p)).await)
    }

    async fn search(&self, query: &str) -> ProductResult<Vec<Product>> {
        Ok(self.sorted(|p| p.matches_search(query)).await)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let product = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;
        product.apply_update(input);

        tracing::info!(product_id = %id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Err(ProductError::NotFound(id))
        }
    }

    async fn exists_by_name(&self, name: &str) -> ProductResult<bool> {
        let products = self.products.read().await;
        Ok(products.values().any(|p| p.name == name))
    }
}
