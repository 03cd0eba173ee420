//! Product Service - Business logic layer

use axum_helpers::Pagination;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

pub const EMPTY_SEARCH_MESSAGE: &str = "search query cannot be empty";

/// Product service providing business logic operations
///
/// Validates input and forwards to the repository. Paging is applied here, after
/// the repository has returned the full result set.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        if self.repository.exists_by_name(&input.name).await? {
            return Err(ProductError::DuplicateName(input.name));
        }

        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self, pagination: Pagination) -> ProductResult<Vec<Product>> {
        let products = self.repository.list().await?;
        Ok(pagination.paginate(products))
    }

    #[instrument(skip(self))]
    pub async fn filter_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        let products = if filter.is_empty() {
            self.repository.list().await?
        } else {
            self.repository.filter(filter).await?
        };
        Ok(pagination.paginate(products))
    }

    /// Fails with a validation error when `query` is empty or whitespace.
    #[instrument(skip(self))]
    pub async fn search_products(
        &self,
        query: &str,
        pagination: Pagination,
    ) -> ProductResult<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProductError::Validation(EMPTY_SEARCH_MESSAGE.to_string()));
        }

        let products = self.repository.search(query).await?;
        Ok(pagination.paginate(products))
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::Validation(e.to_string()))?;

        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        if let Some(ref new_name) = input.name {
            if new_name != &existing.name && self.repository.exists_by_name(new_name).await? {
                return Err(ProductError::DuplicateName(new_name.clone()));
            }
        }

        self.repository.update(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryProductRepository, MockProductRepository};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_filter_without_criteria_lists_everything() {
        let mut mock = MockProductRepository::new();
        mock.expect_list().times(1).returning(|| Ok(Vec::new()));
        mock.expect_filter().never();

        let service = ProductService::new(mock);
        let found = service
            .filter_products(ProductFilter::default(), Pagination::new(None, None))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_filter_with_criteria_queries_store() {
        let mut mock = MockProductRepository::new();
        mock.expect_list().never();
        mock.expect_filter()
            .withf(|f| f.in_stock == Some(true))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = ProductService::new(mock);
        let filter = ProductFilter {
            in_stock: Some(true),
            ..Default::default()
        };
        service
            .filter_products(filter, Pagination::new(None, None))
            .await
            .unwrap();
    }

    fn input(name: &str, price: f64) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            price,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let service = ProductService::new(MockProductRepository::new());
        let err = service.create_product(input("", 1.0)).await.unwrap_err();
        assert!(matches!(err, ProductError::Validation(msg) if msg.contains("name is required")));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut repo = MockProductRepository::new();
        repo.expect_exists_by_name()
            .with(eq("Lamp"))
            .returning(|_| Ok(true));
        repo.expect_create().never();

        let service = ProductService::new(repo);
        let err = service.create_product(input("Lamp", 1.0)).await.unwrap_err();
        assert!(matches!(err, ProductError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(repo);
        let id = Uuid::now_v7();
        let err = service.get_product(id).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_driver_error_passes_through() {
        let mut repo = MockProductRepository::new();
        repo.expect_list()
            .returning(|| Err(ProductError::Database("connection refused".into())));

        let service = ProductService::new(repo);
        let err = service
            .list_products(Pagination::new(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Database(msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query_without_touching_store() {
        let mut repo = MockProductRepository::new();
        repo.expect_search().never();

        let service = ProductService::new(repo);
        for query in ["", "   "] {
            let err = service
                .search_products(query, Pagination::new(None, None))
                .await
                .unwrap_err();
            assert!(matches!(err, ProductError::Validation(ref msg) if msg == EMPTY_SEARCH_MESSAGE));
        }
    }

    #[tokio::test]
    async fn test_list_paginates_after_full_retrieval() {
        let repo = InMemoryProductRepository::new();
        for i in 0..25 {
            repo.create(input(&format!("p{i:02}"), i as f64)).await.unwrap();
        }
        let service = ProductService::new(repo);

        let page3 = service
            .list_products(Pagination::new(Some("3"), Some("10")))
            .await
            .unwrap();
        assert_eq!(page3.len(), 5);
        assert_eq!(page3[0].name, "p20");

        let page10 = service
            .list_products(Pagination::new(Some("10"), Some("10")))
            .await
            .unwrap();
        assert!(page10.is_empty());
    }

    #[tokio::test]
    async fn test_update_to_taken_name_conflicts() {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Lamp", 1.0)).await.unwrap();
        let chair = repo.create(input("Chair", 2.0)).await.unwrap();
        let service = ProductService::new(repo);

        let err = service
            .update_product(
                chair.id,
                UpdateProduct {
                    name: Some("Lamp".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_update_same_name_is_allowed() {
        let repo = InMemoryProductRepository::new();
        let lamp = repo.create(input("Lamp", 1.0)).await.unwrap();
        let service = ProductService::new(repo);

        let updated = service
            .update_product(
                lamp.id,
                UpdateProduct {
                    name: Some("Lamp".into()),
                    price: Some(3.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 3.0);
    }

    #[tokio::test]
    async fn test_filter_with_no_criteria_equals_list() {
        let repo = InMemoryProductRepository::new();
        for i in 0..3 {
            repo.create(input(&format!("p{i}"), 1.0)).await.unwrap();
        }
        let service = ProductService::new(repo);

        let all = service.list_products(Pagination::new(None, None)).await.unwrap();
        let filtered = service
            .filter_products(ProductFilter::default(), Pagination::new(None, None))
            .await
            .unwrap();
        assert_eq!(all, filtered);
    }
}
