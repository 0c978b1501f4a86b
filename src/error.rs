use thiserror::Error;

/// Failure raised by a persistence adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("column `{0}` cannot be used for lookups on {1}")]
    UnknownColumn(&'static str, &'static str),
    #[error("row {0} no longer exists in {1}")]
    RowMissing(i64, &'static str),
}

/// The caller-visible outcome of a failed controller operation.
///
/// `Display` renders exactly the message returned to the client; store
/// faults pass through untranslated.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} is already in use")]
    InUse(&'static str),
    #[error("resource not found")]
    NotFound,
    // TODO: log the fault and return an opaque "server error" instead of leaking storage details
    #[error(transparent)]
    Store(#[from] StoreError),
}
