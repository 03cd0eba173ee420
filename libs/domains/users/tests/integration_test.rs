//! PostgreSQL-backed store tests. Run with `cargo test -- --ignored` (needs Docker).

use database::postgres::ensure_schema;
use domain_users::{
    CreateUser, PostgresUserRepository, Role, User, UserError, UserRepository, USERS_SCHEMA,
};
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

async fn repository() -> (TestDatabase, PostgresUserRepository) {
    let db = TestDatabase::new().await;
    ensure_schema(&db.connection, USERS_SCHEMA).await.unwrap();
    let repo = PostgresUserRepository::new(db.connection());
    (db, repo)
}

fn user(email: String, role: Role) -> User {
    User::new(
        CreateUser {
            first_name: "Test".into(),
            last_name: "User".into(),
            email,
            password: "not-hashed-in-store-tests".into(),
            role: Some(role),
        },
        "$argon2id$placeholder".into(),
    )
}

#[tokio::test]
#[ignore]
async fn test_create_and_lookup() {
    let (_db, repo) = repository().await;
    let data = TestDataBuilder::from_test_name("test_create_and_lookup");
    let email = data.email("ada");

    let created = repo.create(user(email.clone(), Role::Admin)).await.unwrap();

    let by_id = assert_some(repo.get_by_id(created.id).await.unwrap(), "lookup by id");
    assert_uuid_eq(by_id.id, created.id, "user id");
    assert_eq!(by_id.role, Role::Admin);

    let by_email = assert_some(repo.get_by_email(&email).await.unwrap(), "lookup by email");
    assert_uuid_eq(by_email.id, created.id, "user id");
    assert!(repo.email_exists(&email).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_unique_email_constraint() {
    let (_db, repo) = repository().await;
    let email = TestDataBuilder::from_test_name("test_unique_email_constraint").email("dup");

    repo.create(user(email.clone(), Role::User)).await.unwrap();
    let err = repo.create(user(email, Role::User)).await.unwrap_err();
    assert!(matches!(err, UserError::DuplicateEmail(_)));
}

#[tokio::test]
#[ignore]
async fn test_update_list_and_delete() {
    let (_db, repo) = repository().await;
    let data = TestDataBuilder::from_test_name("test_update_list_and_delete");

    let mut first = repo.create(user(data.email("one"), Role::User)).await.unwrap();
    let second = repo.create(user(data.email("two"), Role::User)).await.unwrap();

    first.role = Role::Admin;
    first.last_name = "Promoted".into();
    let updated = repo.update(first.clone()).await.unwrap();
    assert_eq!(updated.last_name, "Promoted");

    let users = repo.list_by_role(Role::User).await.unwrap();
    let ids: Vec<_> = users.iter().map(|u| u.id).collect();
    assert_ids_eq(&ids, &[second.id], "remaining plain users");

    assert!(repo.delete_by_email(&first.email).await.unwrap());
    assert!(!repo.delete_by_email(&first.email).await.unwrap());
    assert!(repo.get_by_id(first.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_schema_is_idempotent() {
    let (db, _repo) = repository().await;
    ensure_schema(&db.connection, USERS_SCHEMA).await.unwrap();
}
