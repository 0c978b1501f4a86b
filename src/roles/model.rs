use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::store::Entity;

/// Role record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Role {
    /// An unsaved role; the store assigns the id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Role {
    const TABLE: &'static str = "roles";
    const LOOKUP_COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            _ => None,
        }
    }

    fn mark_created(&mut self, id: i64, at: OffsetDateTime) {
        self.id = id;
        self.created_at = at;
        self.updated_at = at;
    }

    fn mark_updated(&mut self, at: OffsetDateTime) {
        self.updated_at = at;
    }
}
