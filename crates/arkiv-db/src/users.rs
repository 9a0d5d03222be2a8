//! User store
//!
//! Database operations for admin-managed user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use arkiv_core::pagination::{PageParams, Paginated};
use arkiv_core::traits::Id;

use crate::store::{StoreError, StoreResult};

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Id,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string; never rendered
    pub password_hash: String,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a user
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

/// DTO for updating a user; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Entity access for users: the interface the admin views are written
/// against. Listing is always ordered by `username` ascending.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<UserRow>>;
    async fn find_by_id(&self, id: Id) -> StoreResult<Option<UserRow>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>>;
    async fn create(&self, dto: CreateUserDto) -> StoreResult<UserRow>;
    async fn update(&self, id: Id, dto: UpdateUserDto) -> StoreResult<UserRow>;
    /// Delete the given ids in one statement, returning how many rows went away
    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64>;
}

/// Postgres-backed user store
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_superuser, is_active, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<UserRow>> {
        let items = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY username ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    async fn find_by_id(&self, id: Id) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateUserDto) -> StoreResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, is_superuser, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.password_hash)
        .bind(dto.is_superuser)
        .bind(dto.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_unique_violation(e, "username"))?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateUserDto) -> StoreResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($1, username),
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                is_superuser = COALESCE($4, is_superuser),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&dto.password_hash)
        .bind(dto.is_superuser)
        .bind(dto.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_unique_violation(e, "username"))?
        .ok_or_else(|| StoreError::NotFound(format!("User with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
