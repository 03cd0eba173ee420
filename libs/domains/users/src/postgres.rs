use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};
use crate::repository::UserRepository;

/// DDL applied at startup with `database::postgres::ensure_schema`.
pub const USERS_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'user',
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users (role)",
];

const COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, created_at, updated_at";

/// PostgreSQL implementation of UserRepository using SeaORM raw statements
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_one(&self, stmt: Statement) -> UserResult<Option<User>> {
        UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|_| UserError::Database(format!("unknown role '{}' for user {}", row.role, row.id)))?;

        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = format!(
            "INSERT INTO users ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::DuplicateEmail(user.email.clone())
                } else {
                    e.into()
                }
            })?
            .ok_or_else(|| UserError::Database("insert returned no row".to_string()))?;

        tracing::info!("User created successfully");
        row.try_into()
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        self.fetch_one(Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]))
            .await
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        self.fetch_one(Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]))
            .await
    }

    #[instrument(skip(self))]
    async fn list_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY id");
        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, sql, [role.to_string().into()]);

        UserRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let sql = format!(
            "UPDATE users \
             SET first_name = $2, last_name = $3, password_hash = $4, role = $5, updated_at = $6 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.first_name.clone().into(),
                user.last_name.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.updated_at.into(),
            ],
        );

        self.fetch_one(stmt).await?.ok_or(UserError::NotFound(user.id))
    }

    #[instrument(skip(self))]
    async fn delete_by_email(&self, email: &str) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE email = $1",
            [email.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists",
            [email.into()],
        );

        #[derive(FromQueryResult)]
        struct ExistsResult {
            exists: bool,
        }

        let result = ExistsResult::find_by_statement(stmt).one(&self.db).await?;
        Ok(result.is_some_and(|r| r.exists))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn row(id: Uuid, email: &str, role: &str) -> BTreeMap<&'static str, Value> {
        let now = Utc::now();
        BTreeMap::from([
            ("id", id.into()),
            ("first_name", "Grace".into()),
            ("last_name", "Hopper".into()),
            ("email", email.into()),
            ("password_hash", "$argon2id$stub".into()),
            ("role", role.into()),
            ("created_at", now.into()),
            ("updated_at", now.into()),
        ])
    }

    #[tokio::test]
    async fn test_get_by_email_maps_row() {
        let id = Uuid::now_v7();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row(id, "grace@example.com", "admin")]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        let user = repo.get_by_email("grace@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unknown_role_is_a_database_error() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row(Uuid::now_v7(), "x@example.com", "superuser")]])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        assert!(matches!(
            repo.get_by_email("x@example.com").await,
            Err(UserError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PostgresUserRepository::new(db);

        assert!(repo.delete_by_email("a@example.com").await.unwrap());
        assert!(!repo.delete_by_email("a@example.com").await.unwrap());
    }

    #[test]
    fn test_schema_declares_unique_email() {
        assert!(USERS_SCHEMA[0].contains("email         TEXT NOT NULL UNIQUE"));
    }
}
