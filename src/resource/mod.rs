//! The controller contract shared by every REST resource, plus the glue that
//! mounts a controller on an axum router.

pub mod extract;
pub mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::Method;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ControllerError;
use crate::store::{Entity, Repository};

/// Flat string-keyed request input gathered from body, query and path.
pub type Params = HashMap<String, String>;

/// Per-request data a controller may log or inspect.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
}

impl RequestMeta {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method,
            path: path.into(),
        }
    }
}

/// List/Create/Read/Update/Delete for one entity type.
#[async_trait]
pub trait ResourceController: Send + Sync + 'static {
    type Model: Entity + Serialize;

    /// Singular resource name, used for the base path and the delete message.
    const NAME: &'static str;

    async fn list(
        &self,
        meta: &RequestMeta,
        params: &Params,
    ) -> Result<Vec<Self::Model>, ControllerError>;

    async fn create(&self, meta: &RequestMeta, params: &Params)
        -> Result<Self::Model, ControllerError>;

    async fn read(&self, meta: &RequestMeta, params: &Params)
        -> Result<Self::Model, ControllerError>;

    async fn update(&self, meta: &RequestMeta, params: &Params)
        -> Result<Self::Model, ControllerError>;

    async fn delete(&self, meta: &RequestMeta, params: &Params) -> Result<String, ControllerError>;
}

/// Returns the value of a required key. Presence is what counts, an empty
/// string is a valid value.
pub fn require<'a>(params: &'a Params, field: &'static str) -> Result<&'a str, ControllerError> {
    match params.get(field) {
        Some(value) => Ok(value.as_str()),
        None => {
            warn!(field, "required parameter missing");
            Err(ControllerError::Required(field))
        }
    }
}

/// Loads the row named by the `id` parameter.
///
/// An id that is not an integer cannot match any row and is reported the
/// same way as an id with no row behind it. Surrounding whitespace is not
/// stripped, so `" 1 "` is not an integer either.
pub async fn find_existing<E: Entity>(
    repo: &dyn Repository<E>,
    params: &Params,
) -> Result<E, ControllerError> {
    let raw = require(params, "id")?;
    let Ok(id) = raw.parse::<i64>() else {
        warn!(table = E::TABLE, id = raw, "id is not numeric");
        return Err(ControllerError::NotFound);
    };

    debug!(table = E::TABLE, id, "looking up row");
    match repo.find_by_id(id).await? {
        Some(row) => Ok(row),
        None => {
            warn!(table = E::TABLE, id, "row not found");
            Err(ControllerError::NotFound)
        }
    }
}

/// Fails with a conflict when any row already holds `value` in `column`.
///
/// This is a read-then-decide check; it does not guard against a concurrent
/// insert of the same value.
pub async fn ensure_unique<E: Entity>(
    repo: &dyn Repository<E>,
    column: &'static str,
    value: &str,
) -> Result<(), ControllerError> {
    if let Some(existing) = repo.find_by(column, value).await? {
        warn!(table = E::TABLE, column, existing_id = existing.id(), "value already in use");
        return Err(ControllerError::InUse(column));
    }
    Ok(())
}

pub fn deleted_message(resource: &str) -> String {
    format!("{resource} deleted")
}
