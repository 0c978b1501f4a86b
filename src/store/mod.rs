pub mod memory;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::StoreError;

pub use memory::MemoryRepository;
#[cfg(test)]
pub(crate) use memory::FailingWrites;

/// A persisted record with a surrogate id assigned by the store.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Table backing the entity; also used in log fields and fault messages.
    const TABLE: &'static str;
    /// Columns that may be used with [`Repository::find_by`].
    const LOOKUP_COLUMNS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Value of a lookup column, `None` when the column is not searchable.
    fn column(&self, name: &str) -> Option<&str>;

    /// Called by the store when the row is first written.
    fn mark_created(&mut self, id: i64, at: OffsetDateTime);

    /// Called by the store on every whole-row save.
    fn mark_updated(&mut self, at: OffsetDateTime);
}

/// Persistence port handed to every resource controller.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<E>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, StoreError>;

    /// First row whose `column` equals `value`.
    async fn find_by(&self, column: &'static str, value: &str) -> Result<Option<E>, StoreError>;

    /// Inserts a new row and returns it with the assigned id.
    async fn insert(&self, entity: E) -> Result<E, StoreError>;

    /// Overwrites every column of an existing row.
    async fn save(&self, entity: &E) -> Result<E, StoreError>;

    /// Removes the row, returning the number of rows affected.
    async fn delete(&self, entity: &E) -> Result<u64, StoreError>;
}

/// Rejects lookups on columns the entity does not expose.
pub(crate) fn check_lookup_column<E: Entity>(column: &'static str) -> Result<(), StoreError> {
    if E::LOOKUP_COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(StoreError::UnknownColumn(column, E::TABLE))
    }
}
