use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::roles::Role;
use crate::store::Entity;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored exactly as given. Responses carry every other field but never
    /// this one.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub email_verified_at: Option<OffsetDateTime>,
    // Associations are schema-only here; nothing loads them eagerly.
    #[sqlx(skip)]
    #[serde(default)]
    pub roles: Vec<Role>,
    #[sqlx(skip)]
    #[serde(default)]
    pub password_resets: Vec<PasswordReset>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// An unsaved, unverified user with no roles.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            username: username.into(),
            password: password.into(),
            email: email.into(),
            email_verified_at: None,
            roles: Vec::new(),
            password_resets: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const LOOKUP_COLUMNS: &'static [&'static str] = &["username", "email"];

    fn id(&self) -> i64 {
        self.id
    }

    fn column(&self, name: &str) -> Option<&str> {
        match name {
            "username" => Some(&self.username),
            "email" => Some(&self.email),
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

/// Password reset token issued for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PasswordReset {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub valid_until: OffsetDateTime,
}
