use async_trait::async_trait;
use sqlx::PgPool;

use super::model::Role;
use crate::error::StoreError;
use crate::store::{check_lookup_column, Entity, Repository};

/// Postgres-backed role store. Deleted rows stay in the table with
/// `deleted_at` set and are hidden from every read.
#[derive(Clone)]
pub struct PgRoleRepository {
    db: PgPool,
}

impl PgRoleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<Role> for PgRoleRepository {
    async fn find_all(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, StoreError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(role)
    }

    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<Role>, StoreError> {
        check_lookup_column::<Role>(column)?;
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM roles
            WHERE name = $1 AND deleted_at IS NULL
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(value)
        .fetch_optional(&self.db)
        .await?;
        Ok(role)
    }

    async fn insert(&self, role: Role) -> Result<Role, StoreError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(&role.name)
        .fetch_one(&self.db)
        .await?;
        Ok(role)
    }

    async fn save(&self, role: &Role) -> Result<Role, StoreError> {
        sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
               SET name = $2, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::RowMissing(role.id, Role::TABLE))
    }

    async fn delete(&self, role: &Role) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE roles
               SET deleted_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role.id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }
}
