use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{JwtAuth, JwtClaims};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, LoginResult, Role, UpdateUser, User};
use crate::repository::UserRepository;

/// Service layer for accounts and login
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R, jwt: JwtAuth) -> Self {
        Self {
            repository: Arc::new(repository),
            jwt,
        }
    }

    /// Register a user; the password is stored as an argon2 hash.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        input.validate()?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        self.repository.create(User::new(input, password_hash)).await
    }

    /// Check credentials and issue a token for the user.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> UserResult<LoginResult> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .jwt
            .issue(user.id, &user.email, &user.role.to_string())?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResult { token, user })
    }

    pub async fn user(&self, id: Uuid) -> UserResult<Option<User>> {
        self.repository.get_by_id(id).await
    }

    pub async fn user_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.get_by_email(email).await
    }

    pub async fn users_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        self.repository.list_by_role(role).await
    }

    /// Update names, password (rehashed) and role of the user with `email`.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, email: &str, input: UpdateUser) -> UserResult<User> {
        input.validate()?;

        let mut user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::EmailNotFound(email.to_string()))?;

        let new_password_hash = input.password.as_deref().map(hash_password).transpose()?;
        user.apply_update(input, new_password_hash);

        self.repository.update(user).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, email: &str) -> UserResult<bool> {
        self.repository.delete_by_email(email).await
    }

    /// The user the token was issued to. Missing if the account was deleted since.
    pub async fn me(&self, claims: &JwtClaims) -> UserResult<User> {
        self.repository
            .get_by_id(claims.id)
            .await?
            .ok_or(UserError::NotFound(claims.id))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            jwt: self.jwt.clone(),
        }
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use axum_helpers::JwtConfig;
    use mockall::predicate::eq;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("service-test-secret-at-least-32-chars").unwrap())
    }

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::new(InMemoryUserRepository::new(), jwt())
    }

    fn ada() -> CreateUser {
        CreateUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: "difference-engine".into(),
            role: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let user = service().create_user(ada()).await.unwrap();
        assert_ne!(user.password_hash, "difference-engine");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = service();
        service.create_user(ada()).await.unwrap();

        let err = service.create_user(ada()).await.unwrap_err();
        assert_eq!(err.to_string(), "user with email ada@example.com already exists");
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_input() {
        let input = CreateUser {
            email: "nope".into(),
            ..ada()
        };
        assert!(matches!(
            service().create_user(input).await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let service = service();
        let created = service.create_user(ada()).await.unwrap();

        let result = service
            .login("ada@example.com", "difference-engine")
            .await
            .unwrap();
        assert_eq!(result.user.id, created.id);

        let claims = jwt().validate(&result.token).unwrap();
        assert_eq!(claims.id, created.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.iss, "cloudmarket");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_or_unknown_email() {
        let service = service();
        service.create_user(ada()).await.unwrap();

        assert!(matches!(
            service.login("ada@example.com", "wrong-password").await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("nobody@example.com", "difference-engine").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password_and_sets_role() {
        let service = service();
        service.create_user(ada()).await.unwrap();

        let updated = service
            .update_user(
                "ada@example.com",
                UpdateUser {
                    password: Some("new-password-123".into()),
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);

        assert!(service.login("ada@example.com", "new-password-123").await.is_ok());
        assert!(service.login("ada@example.com", "difference-engine").await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let err = service()
            .update_user("ghost@example.com", UpdateUser::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_reports_whether_removed() {
        let service = service();
        service.create_user(ada()).await.unwrap();

        assert!(service.delete_user("ada@example.com").await.unwrap());
        assert!(!service.delete_user("ada@example.com").await.unwrap());
        assert!(service.user_by_email("ada@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_by_role() {
        let service = service();
        service.create_user(ada()).await.unwrap();
        service
            .create_user(CreateUser {
                email: "root@example.com".into(),
                role: Some(Role::Admin),
                ..ada()
            })
            .await
            .unwrap();

        let admins = service.users_by_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "root@example.com");
    }

    #[tokio::test]
    async fn test_me_propagates_store_error() {
        let id = Uuid::now_v7();
        let mut mock = MockUserRepository::new();
        mock.expect_get_by_id()
            .with(eq(id))
            .returning(|_| Err(UserError::Database("connection reset".into())));

        let service = UserService::new(mock, jwt());
        let claims = JwtClaims {
            id,
            email: "ada@example.com".into(),
            role: "user".into(),
            iss: "cloudmarket".into(),
            exp: 0,
        };

        let err = service.me(&claims).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }
}
