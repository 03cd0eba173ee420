use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Category entity. Categories form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Category name, unique across the catalog
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent category; absent for a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Products assigned to this category
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Optional criteria for `GET /categories/filter`
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Direct children of this category
    pub parent_id: Option<Uuid>,
    /// Only categories without a parent. Takes precedence over `parent_id`.
    pub root_only: Option<bool>,
}

/// Body of `assign-product` and `remove-product`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductAssignment {
    pub product_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl CategoryFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none() && self.root_only != Some(true)
    }

    pub fn matches(&self, category: &Category) -> bool {
        if let Some(ref name) = self.name {
            if !category.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if self.root_only == Some(true) {
            return category.parent_id.is_none();
        }
        if let Some(parent_id) = self.parent_id {
            return category.parent_id == Some(parent_id);
        }
        true
    }
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            parent_id: input.parent_id,
            product_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn apply_update(&mut self, update: UpdateCategory) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(parent_id) = update.parent_id {
            self.parent_id = Some(parent_id);
        }
    }

    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        Category::new(CreateCategory {
            name: name.into(),
            description: Some("Outdoor gear".into()),
            parent_id,
        })
    }

    #[test]
    fn test_root_only_excludes_children() {
        let filter = CategoryFilter {
            root_only: Some(true),
            ..Default::default()
        };
        assert!(filter.matches(&category("Sports", None)));
        assert!(!filter.matches(&category("Running", Some(Uuid::now_v7()))));
    }

    #[test]
    fn test_root_only_wins_over_parent_id() {
        let parent = Uuid::now_v7();
        let filter = CategoryFilter {
            parent_id: Some(parent),
            root_only: Some(true),
            ..Default::default()
        };
        assert!(!filter.matches(&category("Running", Some(parent))));
    }

    #[test]
    fn test_parent_and_name_combine() {
        let parent = Uuid::now_v7();
        let filter = CategoryFilter {
            name: Some("RUN".into()),
            parent_id: Some(parent),
            ..Default::default()
        };
        assert!(filter.matches(&category("Trail Running", Some(parent))));
        assert!(!filter.matches(&category("Cycling", Some(parent))));
        assert!(!filter.matches(&category("Running", None)));
    }

    #[test]
    fn test_search_checks_description() {
        let c = category("Sports", None);
        assert!(c.matches_search("outdoor"));
        assert!(!c.matches_search("kitchen"));
    }

    #[test]
    fn test_root_is_serialized_without_parent_field() {
        let json = serde_json::to_value(category("Sports", None)).unwrap();
        assert!(json.get("parent_id").is_none());
        assert_eq!(json["product_ids"], serde_json::json!([]));
    }
}
