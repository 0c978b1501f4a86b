use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;

use crate::config::AppConfig;
use crate::roles::{PgRoleRepository, Role};
use crate::store::{MemoryRepository, Repository};
use crate::users::{PgUserRepository, User};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Set only when running against Postgres.
    pub db: Option<PgPool>,
    pub users: Arc<dyn Repository<User>>,
    pub roles: Arc<dyn Repository<Role>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(database) = config.database.clone() else {
            warn!("DATABASE_URL not set; using the in-memory store, data is lost on exit");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .connect(&database.url)
            .await
            .context("connect to database")?;

        Ok(Self {
            config,
            users: Arc::new(PgUserRepository::new(db.clone())),
            roles: Arc::new(PgRoleRepository::new(db.clone())),
            db: Some(db),
        })
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            db: None,
            users: Arc::new(MemoryRepository::<User>::new()),
            roles: Arc::new(MemoryRepository::<Role>::new()),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(Arc::new(AppConfig {
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        }))
    }
}
