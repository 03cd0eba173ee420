//! Category Service - Business logic layer

use axum_helpers::Pagination;
use domain_products::Product;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryFilter, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;

pub const EMPTY_SEARCH_MESSAGE: &str = "search query cannot be empty";

/// Primary category (unless nil) followed by the secondary ones, without duplicates.
pub fn product_category_ids(product: &Product) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    product
        .primary_category()
        .into_iter()
        .chain(product.categories.iter().copied())
        .filter(|id| !id.is_nil() && seen.insert(*id))
        .collect()
}

pub struct CategoryService<R: CategoryRepository> {
    repository: Arc<R>,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(category_name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        if self.repository.exists_by_name(&input.name).await? {
            return Err(CategoryError::DuplicateName(input.name));
        }

        self.repository.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> CategoryResult<Category> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self, pagination: Pagination) -> CategoryResult<Vec<Category>> {
        let categories = self.repository.list().await?;
        Ok(pagination.paginate(categories))
    }

    #[instrument(skip(self))]
    pub async fn search_categories(
        &self,
        query: &str,
        pagination: Pagination,
    ) -> CategoryResult<Vec<Category>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CategoryError::Validation(EMPTY_SEARCH_MESSAGE.to_string()));
        }

        let categories = self.repository.search(query).await?;
        Ok(pagination.paginate(categories))
    }

    #[instrument(skip(self))]
    pub async fn filter_categories(
        &self,
        filter: CategoryFilter,
        pagination: Pagination,
    ) -> CategoryResult<Vec<Category>> {
        let categories = if filter.is_empty() {
            self.repository.list().await?
        } else {
            self.repository.filter(filter).await?
        };
        Ok(pagination.paginate(categories))
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> CategoryResult<Category> {
        input
            .validate()
            .map_err(|e| CategoryError::Validation(e.to_string()))?;

        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        if let Some(ref new_name) = input.name {
            if new_name != &existing.name && self.repository.exists_by_name(new_name).await? {
                return Err(CategoryError::DuplicateName(new_name.clone()));
            }
        }

        self.repository.update(id, input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> CategoryResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn subcategories(&self, parent_id: Uuid) -> CategoryResult<Vec<Category>> {
        self.repository.subcategories(parent_id).await
    }

    #[instrument(skip(self))]
    pub async fn assign_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        self.repository.assign_product(product_id, category_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        self.repository.remove_product(product_id, category_id).await
    }

    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category_id: Uuid) -> CategoryResult<Vec<Product>> {
        self.repository.products_in_category(category_id).await
    }

    /// Path from the furthest reachable ancestor down to `category_id`, inclusive.
    ///
    /// A missing record ends the walk: an unknown `category_id` gives an empty
    /// path and a dangling `parent_id` gives the path below it. Revisiting a
    /// category fails with `CycleDetected`.
    #[instrument(skip(self))]
    pub async fn hierarchy(&self, category_id: Uuid) -> CategoryResult<Vec<Category>> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(category_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                tracing::warn!(category_id = %id, "cycle in category parent chain");
                return Err(CategoryError::CycleDetected(id));
            }

            let Some(category) = self.repository.get_by_id(id).await? else {
                break;
            };

            current = category.parent_id;
            path.push(category);
        }

        path.reverse();
        Ok(path)
    }

    /// Categories of a product in first-occurrence order of their ids.
    #[instrument(skip(self))]
    pub async fn categories_for_product(&self, product_id: Uuid) -> CategoryResult<Vec<Category>> {
        let product = self
            .repository
            .get_product(product_id)
            .await?
            .ok_or(CategoryError::ProductNotFound(product_id))?;

        let ids = product_category_ids(&product);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: HashMap<Uuid, Category> = self
            .repository
            .get_by_ids(ids.clone())
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }
}

impl<R: CategoryRepository> Clone for CategoryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCategoryRepository, MockCategoryRepository};
    use chrono::Utc;
    use domain_products::{CreateProduct, InMemoryProductRepository, ProductRepository};

    fn raw(id: Uuid, name: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id,
            name: name.into(),
            description: None,
            parent_id,
            product_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn setup() -> (
        InMemoryProductRepository,
        InMemoryCategoryRepository,
        CategoryService<InMemoryCategoryRepository>,
    ) {
        let products = InMemoryProductRepository::new();
        let categories = InMemoryCategoryRepository::new(products.shared());
        let service = CategoryService::new(categories.clone());
        (products, categories, service)
    }

    #[tokio::test]
    async fn test_filter_uses_list_only_without_criteria() {
        let mut mock = MockCategoryRepository::new();
        mock.expect_list().times(1).returning(|| Ok(Vec::new()));
        mock.expect_filter().never();

        let service = CategoryService::new(mock);
        service
            .filter_categories(CategoryFilter::default(), Pagination::new(None, None))
            .await
            .unwrap();

        let mut mock = MockCategoryRepository::new();
        mock.expect_list().never();
        mock.expect_filter()
            .withf(|f| f.root_only == Some(true))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = CategoryService::new(mock);
        let filter = CategoryFilter {
            root_only: Some(true),
            ..Default::default()
        };
        service
            .filter_categories(filter, Pagination::new(None, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hierarchy_is_root_first_and_inclusive() {
        let (_, repo, service) = setup();
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::now_v7()).collect();
        repo.insert_raw(raw(ids[0], "root", None)).await;
        for n in 1..4 {
            repo.insert_raw(raw(ids[n], &format!("level-{n}"), Some(ids[n - 1])))
                .await;
        }

        let path = service.hierarchy(ids[3]).await.unwrap();
        let got: Vec<Uuid> = path.iter().map(|c| c.id).collect();
        assert_eq!(got, ids);
        assert_eq!(path.last().unwrap().id, ids[3]);
    }

    #[tokio::test]
    async fn test_hierarchy_of_root_is_itself() {
        let (_, repo, service) = setup();
        let id = Uuid::now_v7();
        repo.insert_raw(raw(id, "root", None)).await;

        let path = service.hierarchy(id).await.unwrap();
        assert_eq!(path.len(), 1);
    }

    #[tokio::test]
    async fn test_hierarchy_unknown_start_is_empty() {
        let (_, _, service) = setup();
        assert!(service.hierarchy(Uuid::now_v7()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hierarchy_truncates_at_dangling_parent() {
        let (_, repo, service) = setup();
        let child = Uuid::now_v7();
        repo.insert_raw(raw(child, "orphan", Some(Uuid::now_v7()))).await;

        let path = service.hierarchy(child).await.unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].id, child);
    }

    #[tokio::test]
    async fn test_hierarchy_detects_cycle() {
        let (_, repo, service) = setup();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        repo.insert_raw(raw(a, "a", Some(b))).await;
        repo.insert_raw(raw(b, "b", Some(a))).await;

        let err = service.hierarchy(a).await.unwrap_err();
        assert!(matches!(err, CategoryError::CycleDetected(id) if id == a));
    }

    #[tokio::test]
    async fn test_hierarchy_detects_self_parent() {
        let (_, repo, service) = setup();
        let a = Uuid::now_v7();
        repo.insert_raw(raw(a, "a", Some(a))).await;

        assert!(matches!(
            service.hierarchy(a).await,
            Err(CategoryError::CycleDetected(_))
        ));
    }

    #[tokio::test]
    async fn test_hierarchy_propagates_store_errors() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_get_by_id()
            .returning(|_| Err(CategoryError::Database("not primary".into())));

        let service = CategoryService::new(repo);
        let err = service.hierarchy(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, CategoryError::Database(msg) if msg == "not primary"));
    }

    #[tokio::test]
    async fn test_assign_then_remove_restores_both_sides() {
        let (products, repo, service) = setup();
        let product = products
            .create(CreateProduct {
                name: "Tent".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let category = service
            .create_category(CreateCategory {
                name: "Camping".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        service.assign_product(product.id, category.id).await.unwrap();
        assert_eq!(
            service.products_in_category(category.id).await.unwrap().len(),
            1
        );

        service.remove_product(product.id, category.id).await.unwrap();
        let product = products.get_by_id(product.id).await.unwrap().unwrap();
        let category = repo.get_by_id(category.id).await.unwrap().unwrap();
        assert!(product.categories.is_empty());
        assert!(category.product_ids.is_empty());
    }

    #[tokio::test]
    async fn test_assign_to_unknown_category_still_writes_product_side() {
        let (products, _, service) = setup();
        let product = products
            .create(CreateProduct {
                name: "Tent".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let ghost = Uuid::now_v7();

        service.assign_product(product.id, ghost).await.unwrap();

        let product = products.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(product.categories, vec![ghost]);
    }

    #[tokio::test]
    async fn test_categories_for_product_dedupes_primary() {
        let (products, _, service) = setup();
        let outdoor = service
            .create_category(CreateCategory {
                name: "Outdoor".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let camping = service
            .create_category(CreateCategory {
                name: "Camping".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let product = products
            .create(CreateProduct {
                name: "Tent".into(),
                category_id: Some(camping.id),
                ..Default::default()
            })
            .await
            .unwrap();

        service.assign_product(product.id, outdoor.id).await.unwrap();
        service.assign_product(product.id, camping.id).await.unwrap();

        let found = service.categories_for_product(product.id).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![camping.id, outdoor.id]);
    }

    #[tokio::test]
    async fn test_categories_for_product_without_categories_skips_lookup() {
        let mut repo = MockCategoryRepository::new();
        repo.expect_get_product().returning(|id| {
            let mut product = Product::new(CreateProduct {
                name: "Loose".into(),
                ..Default::default()
            });
            product.id = id;
            Ok(Some(product))
        });
        repo.expect_get_by_ids().never();

        let service = CategoryService::new(repo);
        assert!(service
            .categories_for_product(Uuid::now_v7())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_categories_for_unknown_product_is_not_found() {
        let (_, _, service) = setup();
        let id = Uuid::now_v7();
        let err = service.categories_for_product(id).await.unwrap_err();
        assert!(matches!(err, CategoryError::ProductNotFound(missing) if missing == id));
    }

    #[test]
    fn test_product_category_ids_excludes_nil_primary() {
        let mut product = Product::new(CreateProduct {
            name: "Tent".into(),
            ..Default::default()
        });
        let a = Uuid::now_v7();
        product.categories = vec![a, a];

        assert_eq!(product_category_ids(&product), vec![a]);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let (_, _, service) = setup();
        let input = CreateCategory {
            name: "Camping".into(),
            ..Default::default()
        };
        service.create_category(input.clone()).await.unwrap();

        let err = service.create_category(input).await.unwrap_err();
        assert!(matches!(err, CategoryError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn test_search_blank_is_validation_error() {
        let (_, _, service) = setup();
        let err = service
            .search_categories("  ", Pagination::new(None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CategoryError::Validation(msg) if msg == EMPTY_SEARCH_MESSAGE));
    }
}
