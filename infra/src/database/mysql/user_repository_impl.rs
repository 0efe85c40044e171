//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use auth_core::domain::entities::user::{Role, User};
use auth_core::errors::DomainError;
use auth_core::repositories::UserRepository;

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, tenant_id, is_active, created_at, updated_at";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let role: String = row.try_get("role").map_err(|e| column_error("role", e))?;

        Ok(User {
            id: row.try_get("id").map_err(|e| column_error("id", e))?,
            email: row.try_get("email").map_err(|e| column_error("email", e))?,
            first_name: row
                .try_get("first_name")
                .map_err(|e| column_error("first_name", e))?,
            last_name: row
                .try_get("last_name")
                .map_err(|e| column_error("last_name", e))?,
            role: role
                .parse::<Role>()
                .map_err(|message| DomainError::Internal { message })?,
            tenant_id: row
                .try_get("tenant_id")
                .map_err(|e| column_error("tenant_id", e))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| column_error("is_active", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }
}

fn column_error(column: &str, e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, e),
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to find user: {}", e),
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                email, first_name, last_name, role, tenant_id, is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(user.tenant_id)
            .bind(user.is_active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Internal {
                    message: format!("User with email {} already exists", user.email),
                },
                _ => DomainError::Internal {
                    message: format!("Failed to create user: {}", e),
                },
            })?;

        Ok(User {
            id: result.last_insert_id() as i64,
            ..user
        })
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Failed to update user: {}", e),
            })?;

        Ok(result.rows_affected() > 0)
    }
}
