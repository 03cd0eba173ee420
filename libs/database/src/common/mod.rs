//! Error type shared by the PostgreSQL and MongoDB helpers

pub mod error;

pub use error::{DatabaseError, DatabaseResult};
