use async_trait::async_trait;
use domain_products::{Product, SharedProducts};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryFilter, CreateCategory, UpdateCategory};

/// Repository trait for Category persistence and the product/category links.
///
/// Links are stored on both sides (`Product::categories` and
/// `Category::product_ids`) and written with two independent writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category>;

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>>;

    /// Every category, oldest first
    async fn list(&self) -> CategoryResult<Vec<Category>>;

    async fn filter(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>>;

    /// Case-insensitive substring search over name and description
    async fn search(&self, query: &str) -> CategoryResult<Vec<Category>>;

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category>;

    /// Delete a category by ID. Returns `NotFound` when nothing was removed.
    async fn delete(&self, id: Uuid) -> CategoryResult<bool>;

    async fn exists_by_name(&self, name: &str) -> CategoryResult<bool>;

    /// Direct children of `parent_id`
    async fn subcategories(&self, parent_id: Uuid) -> CategoryResult<Vec<Category>>;

    /// Add `category_id` to the product's `categories`, then `product_id` to the
    /// category's `product_ids`.
    ///
    /// Neither id is checked for existence. If the second write fails the first
    /// is not undone and `CategoryError::PartialLink` is returned.
    async fn assign_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()>;

    /// Inverse of [`assign_product`](Self::assign_product), with the same
    /// partial-failure behaviour.
    async fn remove_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()>;

    /// Products whose `categories` contain `category_id`
    async fn products_in_category(&self, category_id: Uuid) -> CategoryResult<Vec<Product>>;

    async fn get_product(&self, product_id: Uuid) -> CategoryResult<Option<Product>>;

    /// Categories with an id in `ids`
    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>>;
}

/// In-memory implementation of CategoryRepository (for development/testing)
///
/// Shares its product map with an `InMemoryProductRepository` so links are
/// visible from both stores.
#[derive(Debug, Clone)]
pub struct InMemoryCategoryRepository {
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
    products: SharedProducts,
}

impl InMemoryCategoryRepository {
    pub fn new(products: SharedProducts) -> Self {
        Self {
            categories: Arc::new(RwLock::new(HashMap::new())),
            products,
        }
    }

    /// Insert a record as-is, bypassing validation. Tests use it to build
    /// parent chains that the API would not produce, such as cycles.
    pub async fn insert_raw(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    async fn sorted(&self, keep: impl Fn(&Category) -> bool) -> Vec<Category> {
        let categories = self.categories.read().await;
        let mut result: Vec<Category> = categories.values().filter(|c| keep(c)).cloned().collect();
        result.sort_by_key(|c| c.id);
        result
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;

        if categories.values().any(|c| c.name == input.name) {
            return Err(CategoryError::DuplicateName(input.name));
        }

        let category = Category::new(input);
        categories.insert(category.id, category.clone());

        tracing::info!(category_id = %category.id, "Created category");
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list(&self) -> CategoryResult<Vec<Category>> {
        Ok(self.sorted(|_| true).await)
    }

    async fn filter(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>> {
        Ok(self.sorted(|c| filter.matches(c)).await)
    }

    async fn search(&self, query: &str) -> CategoryResult<Vec<Category>> {
        Ok(self.sorted(|c| c.matches_search(query)).await)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&id).ok_or(CategoryError::NotFound(id))?;
        category.apply_update(input);

        tracing::info!(category_id = %id, "Updated category");
        Ok(category.clone())
    }

    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        if self.categories.write().await.remove(&id).is_some() {
            tracing::info!(category_id = %id, "Deleted category");
            Ok(true)
        } else {
            Err(CategoryError::NotFound(id))
        }
    }

    async fn exists_by_name(&self, name: &str) -> CategoryResult<bool> {
        Ok(self.categories.read().await.values().any(|c| c.name == name))
    }

    async fn subcategories(&self, parent_id: Uuid) -> CategoryResult<Vec<Category>> {
        Ok(self.sorted(|c| c.parent_id == Some(parent_id)).await)
    }

    async fn assign_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        if let Some(product) = self.products.write().await.get_mut(&product_id) {
            if !product.categories.contains(&category_id) {
                product.categories.push(category_id);
            }
        }
        if let Some(category) = self.categories.write().await.get_mut(&category_id) {
            if !category.product_ids.contains(&product_id) {
                category.product_ids.push(product_id);
            }
        }
        Ok(())
    }

    async fn remove_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        if let Some(product) = self.products.write().await.get_mut(&product_id) {
            product.categories.retain(|id| *id != category_id);
        }
        if let Some(category) = self.categories.write().await.get_mut(&category_id) {
            category.product_ids.retain(|id| *id != product_id);
        }
        Ok(())
    }

    async fn products_in_category(&self, category_id: Uuid) -> CategoryResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut result: Vec<Product> = products
            .values()
            .filter(|p| p.categories.contains(&category_id))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn get_product(&self, product_id: Uuid) -> CategoryResult<Option<Product>> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>> {
        Ok(self.sorted(|c| ids.contains(&c.id)).await)
    }
}
