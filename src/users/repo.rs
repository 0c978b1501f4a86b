use async_trait::async_trait;
use sqlx::PgPool;

use super::model::User;
use crate::error::StoreError;
use crate::store::{check_lookup_column, Entity, Repository};

/// Postgres-backed user store with soft deletes.
#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<User> for PgUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, email, email_verified_at, created_at, updated_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, email, email_verified_at, created_at, updated_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<User>, StoreError> {
        check_lookup_column::<User>(column)?;
        let sql = match column {
            "username" => {
                r#"
                SELECT id, username, password, email, email_verified_at, created_at, updated_at
                FROM users
                WHERE username = $1 AND deleted_at IS NULL
                ORDER BY id
                LIMIT 1
                "#
            }
            _ => {
                r#"
                SELECT id, username, password, email, email_verified_at, created_at, updated_at
                FROM users
                WHERE email = $1 AND deleted_at IS NULL
                ORDER BY id
                LIMIT 1
                "#
            }
        };
        let user = sqlx::query_as::<_, User>(sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, email, email_verified_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password, email, email_verified_at, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.email_verified_at)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username = $2,
                   password = $3,
                   email = $4,
                   email_verified_at = $5,
                   updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, username, password, email, email_verified_at, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.email_verified_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::RowMissing(user.id, User::TABLE))
    }

    async fn delete(&self, user: &User) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET deleted_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user.id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }
}
