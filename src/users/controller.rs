use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::model::User;
use crate::error::ControllerError;
use crate::resource::{
    deleted_message, ensure_unique, find_existing, require, Params, RequestMeta,
    ResourceController,
};
use crate::store::Repository;

/// Fields of a user that an update may overwrite. A key present in the
/// request overwrites, even with an empty string.
#[derive(Debug, Default)]
struct UserPatch {
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
}

impl UserPatch {
    fn from_params(params: &Params) -> Self {
        Self {
            username: params.get("username").cloned(),
            password: params.get("password").cloned(),
            email: params.get("email").cloned(),
        }
    }

    fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
    }
}

pub struct UserController {
    repo: Arc<dyn Repository<User>>,
}

impl UserController {
    pub fn new(repo: Arc<dyn Repository<User>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResourceController for UserController {
    type Model = User;
    const NAME: &'static str = "user";

    #[instrument(skip_all, fields(resource = "user", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn list(&self, meta: &RequestMeta, _params: &Params) -> Result<Vec<User>, ControllerError> {
        let users = self.repo.find_all().await?;
        debug!(count = users.len(), "users listed");
        Ok(users)
    }

    #[instrument(skip_all, fields(resource = "user", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn create(&self, meta: &RequestMeta, params: &Params) -> Result<User, ControllerError> {
        let username = require(params, "username")?;
        let email = require(params, "email")?;
        let password = require(params, "password")?;

        ensure_unique(self.repo.as_ref(), "username", username).await?;
        ensure_unique(self.repo.as_ref(), "email", email).await?;

        let user = self.repo.insert(User::new(username, email, password)).await?;
        info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    #[instrument(skip_all, fields(resource = "user", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn read(&self, meta: &RequestMeta, params: &Params) -> Result<User, ControllerError> {
        find_existing(self.repo.as_ref(), params).await
    }

    #[instrument(skip_all, fields(resource = "user", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn update(&self, meta: &RequestMeta, params: &Params) -> Result<User, ControllerError> {
        let mut user = find_existing(self.repo.as_ref(), params).await?;
        UserPatch::from_params(params).apply(&mut user);

        let user = self.repo.save(&user).await?;
        info!(user_id = user.id, "user updated");
        Ok(user)
    }

    #[instrument(skip_all, fields(resource = "user", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn delete(&self, meta: &RequestMeta, params: &Params) -> Result<String, ControllerError> {
        let user = find_existing(self.repo.as_ref(), params).await?;
        let affected = self.repo.delete(&user).await?;
        info!(user_id = user.id, affected, "user deleted");
        Ok(deleted_message(Self::NAME))
    }
}
