use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;

use super::{check_lookup_column, Entity, Repository};
use crate::error::StoreError;

/// In-process store keyed by id. Rows come back in id order.
pub struct MemoryRepository<E> {
    rows: RwLock<BTreeMap<i64, E>>,
    next_id: AtomicI64,
}

impl<E> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<E> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<E>, StoreError> {
        check_lookup_column::<E>(column)?;
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|row| row.column(column) == Some(value))
            .cloned())
    }

    async fn insert(&self, mut entity: E) -> Result<E, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        entity.mark_created(id, OffsetDateTime::now_utc());
        self.rows.write().await.insert(id, entity.clone());
        debug!(table = E::TABLE, id, "memory row inserted");
        Ok(entity)
    }

    async fn save(&self, entity: &E) -> Result<E, StoreError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&entity.id())
            .ok_or(StoreError::RowMissing(entity.id(), E::TABLE))?;
        let mut saved = entity.clone();
        saved.mark_updated(OffsetDateTime::now_utc());
        *slot = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, entity: &E) -> Result<u64, StoreError> {
        let removed = self.rows.write().await.remove(&entity.id());
        Ok(u64::from(removed.is_some()))
    }
}

/// Reads go to the wrapped store; every write fails with a pool timeout.
#[cfg(test)]
pub(crate) struct FailingWrites<E> {
    pub inner: MemoryRepository<E>,
}

#[cfg(test)]
impl<E> FailingWrites<E> {
    pub fn new(inner: MemoryRepository<E>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
#[async_trait]
impl<E: Entity> Repository<E> for FailingWrites<E> {
    async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, StoreError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<E>, StoreError> {
        self.inner.find_by(column, value).await
    }

    async fn insert(&self, _entity: E) -> Result<E, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn save(&self, _entity: &E) -> Result<E, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _entity: &E) -> Result<u64, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}
