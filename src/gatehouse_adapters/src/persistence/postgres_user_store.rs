use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use gatehouse_core::{Email, NewUser, Role, User, UserStatus, UserStore, UserStoreError};

#[derive(Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PostgresUserStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id.to_string(),
            name: row.name,
            email: Email::parse(&row.email)
                .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?,
            password_hash: Secret::from(row.password_hash),
            role: Role::from_str(&row.role).map_err(UserStoreError::UnexpectedError)?,
            status: UserStatus::from_str(&row.status).map_err(UserStoreError::UnexpectedError)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, name, email, password_hash, role, status, created_at, updated_at";

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Looking up user by email in PostgreSQL", skip_all)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(name = "Looking up user by id in PostgreSQL", skip_all)]
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserStoreError> {
        // Ids are uuids; anything else cannot match a row.
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(name = "Creating user in PostgreSQL", skip_all)]
    async fn create(&self, fields: NewUser) -> Result<User, UserStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
                INSERT INTO users (id, name, email, password_hash, role, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(fields.email.as_str())
        .bind(fields.password_hash.expose_secret())
        .bind(fields.role.as_str())
        .bind(fields.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint().is_some() {
                    return UserStoreError::UserAlreadyExists;
                }
            }
            UserStoreError::UnexpectedError(e.to_string())
        })?;

        User::try_from(row)
    }

    #[tracing::instrument(name = "Updating password hash in PostgreSQL", skip_all)]
    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: Secret<String>,
    ) -> Result<(), UserStoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Err(UserStoreError::UserNotFound);
        };

        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash.expose_secret())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserStoreError::UnexpectedError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }
        Ok(())
    }
}
