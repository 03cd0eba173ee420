//! Shared test utilities for the domain crates.
//!
//! - `TestDatabase`: PostgreSQL container (feature `postgres`)
//! - `TestMongo`: MongoDB container (feature `mongo`)
//! - `TestDataBuilder`: deterministic names, ids and emails
//! - `assertions`: assertion helpers
//!
//! Container-backed tests are marked `#[ignore]` in the domain crates and run
//! with `cargo test -- --ignored` where Docker is available.
//!
//! ```rust,ignore
//! use test_utils::{TestMongo, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn creates_category() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("creates_category");
//!     let db = mongo.database(&builder.name("db", "catalog"));
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Seeded generator so a test produces the same data on every run.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test's name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_category");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// `test-{prefix}-{seed}-{suffix}`; distinct names keep unique indexes happy.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("category", "shoes"), "test-category-7-shoes");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    pub fn email(&self, local: &str) -> String {
        format!("{}+{}@example.com", local, self.seed)
    }
}

pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Asserts that `actual` lists exactly `expected`, in order.
    pub fn assert_ids_eq(actual: &[Uuid], expected: &[Uuid], context: &str) {
        assert_eq!(actual, expected, "{}: id sequence mismatch", context);
    }
}
