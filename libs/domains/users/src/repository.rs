use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Users holding `role`, oldest first
    async fn list_by_role(&self, role: Role) -> UserResult<Vec<User>>;

    /// Write back every mutable column of an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Returns `true` when a row was removed
    async fn delete_by_email(&self, email: &str) -> UserResult<bool>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

#[async_trait]
impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    async fn create(&self, user: User) -> UserResult<User> {
        (**self).create(user).await
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        (**self).get_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        (**self).get_by_email(email).await
    }

    async fn list_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        (**self).list_by_role(role).await
    }

    async fn update(&self, user: User) -> UserResult<User> {
        (**self).update(user).await
    }

    async fn delete_by_email(&self, email: &str) -> UserResult<bool> {
        (**self).delete_by_email(email).await
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        (**self).email_exists(email).await
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().filter(|u| u.role == role).cloned().collect();
        result.sort_by_key(|u| u.id);
        Ok(result)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete_by_email(&self, email: &str) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| u.email != email);

        let deleted = users.len() < before;
        if deleted {
            tracing::info!(email = %email, "Deleted user");
        }
        Ok(deleted)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateUser;

    fn user(email: &str, role: Role) -> User {
        User::new(
            CreateUser {
                first_name: "Test".into(),
                last_name: "User".into(),
                email: email.into(),
                password: "unused-here".into(),
                role: Some(role),
            },
            "hashed_password".into(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("test@example.com", Role::User)).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "test@example.com");

        let fetched = repo.get_by_email("test@example.com").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("test@example.com", Role::User)).await.unwrap();

        let result = repo.create(user("test@example.com", Role::Admin)).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_list_by_role_and_delete_by_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("a@example.com", Role::Admin)).await.unwrap();
        repo.create(user("b@example.com", Role::User)).await.unwrap();
        repo.create(user("c@example.com", Role::Admin)).await.unwrap();

        let admins = repo.list_by_role(Role::Admin).await.unwrap();
        let emails: Vec<_> = admins.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["a@example.com", "c@example.com"]);

        assert!(repo.delete_by_email("a@example.com").await.unwrap());
        assert!(!repo.delete_by_email("a@example.com").await.unwrap());
        assert!(!repo.email_exists("a@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_shared_repository_delegates() {
        let repo: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        repo.create(user("d@example.com", Role::User)).await.unwrap();
        assert!(repo.email_exists("d@example.com").await.unwrap());
    }
}
