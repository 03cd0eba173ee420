//! MongoDB implementation of CategoryRepository

use async_trait::async_trait;
use domain_products::mongodb::{contains_regex, id_bson, is_duplicate_key, PRODUCTS_COLLECTION};
use domain_products::Product;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    error::Error as MongoError,
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryFilter, CreateCategory, UpdateCategory};
use crate::repository::CategoryRepository;

pub const CATEGORIES_COLLECTION: &str = "categories";

fn stable_order() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

fn duplicate_or_database(err: MongoError, name: &str) -> CategoryError {
    if is_duplicate_key(&err) {
        CategoryError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

/// MongoDB implementation of the CategoryRepository.
///
/// Holds both collections because product/category links live on both sides.
#[derive(Clone)]
pub struct MongoCategoryRepository {
    categories: Collection<Category>,
    products: Collection<Product>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection::<Category>(CATEGORIES_COLLECTION),
            products: db.collection::<Product>(PRODUCTS_COLLECTION),
        }
    }

    /// Create the unique index on `name`
    pub async fn init_indexes(&self) -> CategoryResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_name_unique".to_string())
                    .build(),
            )
            .build();

        self.categories.create_index(index).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from CategoryFilter
    pub fn build_filter(filter: &CategoryFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref name) = filter.name {
            doc.insert("name", contains_regex(name));
        }

        if filter.root_only == Some(true) {
            // matches a missing field as well as an explicit null
            doc.insert("parent_id", Bson::Null);
        } else if let Some(parent_id) = filter.parent_id {
            doc.insert("parent_id", id_bson(parent_id));
        }

        doc
    }

    pub fn search_filter(query: &str) -> Document {
        doc! {
            "$or": [
                { "name": contains_regex(query) },
                { "description": contains_regex(query) },
            ]
        }
    }

    async fn find_all(&self, filter: Document) -> CategoryResult<Vec<Category>> {
        let cursor = self
            .categories
            .find(filter)
            .with_options(stable_order())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Apply `product_update` to the product, then `category_update` to the category.
    async fn dual_write(
        &self,
        product_id: Uuid,
        category_id: Uuid,
        product_update: Document,
        category_update: Document,
    ) -> CategoryResult<()> {
        self.products
            .update_one(doc! { "_id": id_bson(product_id) }, product_update)
            .await?;

        if let Err(e) = self
            .categories
            .update_one(doc! { "_id": id_bson(category_id) }, category_update)
            .await
        {
            tracing::warn!(
                product_id = %product_id,
                category_id = %category_id,
                error = %e,
                "category side of link failed, product side already written"
            );
            return Err(CategoryError::PartialLink {
                product_id,
                category_id,
                message: e.to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, input), fields(category_name = %input.name))]
    async fn create(&self, input: CreateCategory) -> CategoryResult<Category> {
        let category = Category::new(input);

        self.categories
            .insert_one(&category)
            .await
            .map_err(|e| duplicate_or_database(e, &category.name))?;

        tracing::info!(category_id = %category.id, "Category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        Ok(self.categories.find_one(doc! { "_id": id_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> CategoryResult<Vec<Category>> {
        self.find_all(doc! {}).await
    }

    #[instrument(skip(self))]
    async fn filter(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>> {
        self.find_all(Self::build_filter(&filter)).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> CategoryResult<Vec<Category>> {
        self.find_all(Self::search_filter(query)).await
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateCategory) -> CategoryResult<Category> {
        let filter = doc! { "_id": id_bson(id) };
        let mut category = self
            .categories
            .find_one(filter.clone())
            .await?
            .ok_or(CategoryError::NotFound(id))?;

        category.apply_update(input);
        self.categories
            .replace_one(filter, &category)
            .await
            .map_err(|e| duplicate_or_database(e, &category.name))?;

        tracing::info!(category_id = %id, "Category updated successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> CategoryResult<bool> {
        let result = self.categories.delete_one(doc! { "_id": id_bson(id) }).await?;

        if result.deleted_count == 0 {
            return Err(CategoryError::NotFound(id));
        }

        tracing::info!(category_id = %id, "Category deleted successfully");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> CategoryResult<bool> {
        let count = self.categories.count_documents(doc! { "name": name }).await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn subcategories(&self, parent_id: Uuid) -> CategoryResult<Vec<Category>> {
        self.find_all(doc! { "parent_id": id_bson(parent_id) }).await
    }

    #[instrument(skip(self))]
    async fn assign_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        self.dual_write(
            product_id,
            category_id,
            doc! { "$addToSet": { "categories": id_bson(category_id) } },
            doc! { "$addToSet": { "product_ids": id_bson(product_id) } },
        )
        .await?;

        tracing::info!(%product_id, %category_id, "Product assigned to category");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_product(&self, product_id: Uuid, category_id: Uuid) -> CategoryResult<()> {
        self.dual_write(
            product_id,
            category_id,
            doc! { "$pull": { "categories": id_bson(category_id) } },
            doc! { "$pull": { "product_ids": id_bson(product_id) } },
        )
        .await?;

        tracing::info!(%product_id, %category_id, "Product removed from category");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn products_in_category(&self, category_id: Uuid) -> CategoryResult<Vec<Product>> {
        let cursor = self
            .products
            .find(doc! { "categories": id_bson(category_id) })
            .with_options(stable_order())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, product_id: Uuid) -> CategoryResult<Option<Product>> {
        Ok(self.products.find_one(doc! { "_id": id_bson(product_id) }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_ids(&self, ids: Vec<Uuid>) -> CategoryResult<Vec<Category>> {
        let ids: Vec<Bson> = ids.into_iter().map(id_bson).collect();
        self.find_all(doc! { "_id": { "$in": ids } }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        assert!(MongoCategoryRepository::build_filter(&CategoryFilter::default()).is_empty());
    }

    #[test]
    fn test_build_filter_root_only_matches_null_parent() {
        let filter = CategoryFilter {
            root_only: Some(true),
            parent_id: Some(Uuid::now_v7()),
            ..Default::default()
        };
        let doc = MongoCategoryRepository::build_filter(&filter);
        assert_eq!(doc.get("parent_id"), Some(&Bson::Null));
    }

    #[test]
    fn test_build_filter_parent_and_name() {
        let parent = Uuid::now_v7();
        let filter = CategoryFilter {
            name: Some("shoe(s)".into()),
            parent_id: Some(parent),
            root_only: Some(false),
        };
        let doc = MongoCategoryRepository::build_filter(&filter);
        assert_eq!(doc.get("parent_id"), Some(&id_bson(parent)));
        let name = doc.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"shoe\(s\)");
    }

    #[test]
    fn test_search_filter_covers_name_and_description() {
        let doc = MongoCategoryRepository::search_filter("run");
        assert_eq!(doc.get_array("$or").unwrap().len(), 2);
    }
}
