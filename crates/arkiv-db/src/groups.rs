//! Group store
//!
//! Database operations for permission groups and their membership.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use arkiv_core::pagination::{PageParams, Paginated};
use arkiv_core::traits::Id;

use crate::store::{StoreError, StoreResult};

/// Group database entity
#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: Id,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a group
#[derive(Debug, Clone)]
pub struct CreateGroupDto {
    pub name: String,
}

/// DTO for updating a group
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupDto {
    pub name: Option<String>,
}

/// Entity access for groups. Listing is always ordered by `name`
/// ascending. Membership is a many-to-many relation with users.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<GroupRow>>;
    async fn find_by_id(&self, id: Id) -> StoreResult<Option<GroupRow>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<GroupRow>>;
    async fn create(&self, dto: CreateGroupDto) -> StoreResult<GroupRow>;
    async fn update(&self, id: Id, dto: UpdateGroupDto) -> StoreResult<GroupRow>;
    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64>;
    /// Ids of users belonging to the group
    async fn member_ids(&self, group_id: Id) -> StoreResult<Vec<Id>>;
    async fn add_member(&self, group_id: Id, user_id: Id) -> StoreResult<()>;
    async fn remove_member(&self, group_id: Id, user_id: Id) -> StoreResult<()>;
}

/// Postgres-backed group store
pub struct PgGroupStore {
    pool: PgPool,
}

impl PgGroupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const GROUP_COLUMNS: &str = "id, name, created_at, updated_at";

#[async_trait]
impl GroupStore for PgGroupStore {
    async fn list(&self, page: PageParams) -> StoreResult<Paginated<GroupRow>> {
        let items = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    async fn find_by_id(&self, id: Id) -> StoreResult<Option<GroupRow>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<GroupRow>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, dto: CreateGroupDto) -> StoreResult<GroupRow> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            INSERT INTO groups (name, created_at, updated_at)
            VALUES ($1, NOW(), NOW())
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_unique_violation(e, "name"))?;

        Ok(row)
    }

    async fn update(&self, id: Id, dto: UpdateGroupDto) -> StoreResult<GroupRow> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE groups SET
                name = COALESCE($1, name),
                updated_at = NOW()
            WHERE id = $2
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_unique_violation(e, "name"))?
        .ok_or_else(|| StoreError::NotFound(format!("Group with id {} not found", id)))?;

        Ok(row)
    }

    async fn delete_many(&self, ids: &[Id]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM groups WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn member_ids(&self, group_id: Id) -> StoreResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, Id>(
            "SELECT user_id FROM user_groups WHERE group_id = $1 ORDER BY user_id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn add_member(&self, group_id: Id, user_id: Id) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_groups (group_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_member(&self, group_id: Id, user_id: Id) -> StoreResult<()> {
        sqlx::query("DELETE FROM user_groups WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
