//! Request extractors with the workspace's error format.

pub mod query_params;
pub mod uuid_path;
pub mod validated_json;

pub use query_params::QueryParams;
pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
