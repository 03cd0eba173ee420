//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, spec::BinarySubtype, Binary, Bson, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

pub const PRODUCTS_COLLECTION: &str = "products";

const DUPLICATE_KEY: i32 = 11000;

/// True when a write was rejected by a unique index (E11000).
pub fn is_duplicate_key(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// BSON value of a `Uuid` as the driver writes it inside documents
/// (binary, generic subtype). Use it for every query on an id field.
pub fn id_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Generic,
        bytes: id.as_bytes().to_vec(),
    })
}

/// Case-insensitive substring match with the input escaped.
pub fn contains_regex(needle: &str) -> Document {
    doc! { "$regex": regex::escape(needle), "$options": "i" }
}

/// Oldest first, so client-side paging is stable.
pub(crate) fn stable_order() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<Product>(PRODUCTS_COLLECTION);
        Self { collection }
    }

    /// Create the unique index on `name`
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_name_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from ProductFilter
    pub fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if filter.min_price.is_some() || filter.max_price.is_some() {
            let mut price_filter = doc! {};
            if let Some(min) = filter.min_price {
                price_filter.insert("$gte", min);
            }
            if let Some(max) = filter.max_price {
                price_filter.insert("$lte", max);
            }
            doc.insert("price", price_filter);
        }

        if let Some(ref status) = filter.status {
            doc.insert("status", status.to_string());
        }

        if let Some(ref brand) = filter.brand {
            doc.insert("brand", contains_regex(brand));
        }

        if let Some(category) = filter.category {
            doc.insert(
                "$or",
                vec![
                    doc! { "category_id": id_bson(category) },
                    doc! { "categories": id_bson(category) },
                ],
            );
        }

        if filter.in_stock == Some(true) {
            doc.insert("stock", doc! { "$gt": 0 });
        }

        doc
    }

    pub fn search_filter(query: &str) -> Document {
        doc! {
            "$or": [
                { "name": contains_regex(query) },
                { "description": contains_regex(query) },
                { "brand": contains_regex(query) },
                { "tags": contains_regex(query) },
            ]
        }
    }

    async fn find_all(&self, filter: Document) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(filter)
            .with_options(stable_order())
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

/// An E11000 from the unique `name` index becomes `DuplicateName`.
fn duplicate_or_database(err: MongoError, name: &str) -> ProductError {
    if is_duplicate_key(&err) {
        ProductError::DuplicateName(name.to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection
            .insert_one(&product)
            .await
            .map_err(|e| duplicate_or_database(e, &product.name))?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let product = self.collection.find_one(doc! { "_id": id_bson(id) }).await?;
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> ProductResult<Vec<Product>> {
        self.find_all(doc! {}).await
    }

    #[instrument(skip(self))]
    async fn filter(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        self.find_all(Self::build_filter(&filter)).await
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> ProductResult<Vec<Product>> {
        self.find_all(Self::search_filter(query)).await
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let filter = doc! { "_id": id_bson(id) };
        let mut product = self
            .collection
            .find_one(filter.clone())
            .await?
            .ok_or(ProductError::NotFound(id))?;

        product.apply_update(input);
        self.collection
            .replace_one(filter, &product)
            .await
            .map_err(|e| duplicate_or_database(e, &product.name))?;

        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id_bson(id) }).await?;

        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn exists_by_name(&self, name: &str) -> ProductResult<bool> {
        let count = self.collection.count_documents(doc! { "name": name }).await?;
        Ok(count > 0)
    }
}
