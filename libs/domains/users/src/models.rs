use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// User roles
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// User entity - matches the `users` table
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all users
    pub email: String,
    /// Argon2 PHC string, never exposed
    #[serde(skip_serializing)]
    #[graphql(skip)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for `createUser`
#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "email is invalid"), length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
    /// Defaults to `USER`
    pub role: Option<Role>,
}

/// Input for `updateUser`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate, InputObject)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Returned by `login`
#[derive(Debug, Clone, SimpleObject)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

impl User {
    /// Build a new user; the password must already be hashed.
    pub fn new(input: CreateUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
            role: input.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates (password should already be hashed if provided)
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
    }
}
