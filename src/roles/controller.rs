use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::model::Role;
use crate::error::ControllerError;
use crate::resource::{
    deleted_message, ensure_unique, find_existing, require, Params, RequestMeta,
    ResourceController,
};
use crate::store::Repository;

/// Fields of a role that an update may overwrite.
#[derive(Debug, Default)]
struct RolePatch {
    name: Option<String>,
}

impl RolePatch {
    fn from_params(params: &Params) -> Self {
        Self {
            name: params.get("name").cloned(),
        }
    }

    fn apply(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
    }
}

pub struct RoleController {
    repo: Arc<dyn Repository<Role>>,
}

impl RoleController {
    pub fn new(repo: Arc<dyn Repository<Role>>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResourceController for RoleController {
    type Model = Role;
    const NAME: &'static str = "role";

    #[instrument(skip_all, fields(resource = "role", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn list(&self, meta: &RequestMeta, _params: &Params) -> Result<Vec<Role>, ControllerError> {
        let roles = self.repo.find_all().await?;
        debug!(count = roles.len(), "roles listed");
        Ok(roles)
    }

    #[instrument(skip_all, fields(resource = "role", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn create(&self, meta: &RequestMeta, params: &Params) -> Result<Role, ControllerError> {
        let name = require(params, "name")?;

        ensure_unique(self.repo.as_ref(), "name", name).await?;

        let role = self.repo.insert(Role::new(name)).await?;
        info!(role_id = role.id, name = %role.name, "role created");
        Ok(role)
    }

    #[instrument(skip_all, fields(resource = "role", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn read(&self, meta: &RequestMeta, params: &Params) -> Result<Role, ControllerError> {
        find_existing(self.repo.as_ref(), params).await
    }

    #[instrument(skip_all, fields(resource = "role", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn update(&self, meta: &RequestMeta, params: &Params) -> Result<Role, ControllerError> {
        let mut role = find_existing(self.repo.as_ref(), params).await?;
        RolePatch::from_params(params).apply(&mut role);

        let role = self.repo.save(&role).await?;
        info!(role_id = role.id, "role updated");
        Ok(role)
    }

    #[instrument(skip_all, fields(resource = "role", request_id = %meta.request_id, method = %meta.method, path = %meta.path))]
    async fn delete(&self, meta: &RequestMeta, params: &Params) -> Result<String, ControllerError> {
        let role = find_existing(self.repo.as_ref(), params).await?;
        let affected = self.repo.delete(&role).await?;
        info!(role_id = role.id, affected, "role deleted");
        Ok(deleted_message(Self::NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{FailingWrites, MemoryRepository};
    use axum::http::Method;

    fn controller() -> (RoleController, Arc<MemoryRepository<Role>>) {
        let repo = Arc::new(MemoryRepository::<Role>::new());
        (RoleController::new(repo.clone()), repo)
    }

    fn meta() -> RequestMeta {
        RequestMeta::new(Method::GET, "/role")
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn list_returns_every_role_in_insertion_order() {
        let (controller, repo) = controller();
        repo.insert(Role::new("Admin")).await.unwrap();
        repo.insert(Role::new("role")).await.unwrap();

        let roles = controller.list(&meta(), &Params::new()).await.unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].name, "Admin");
        assert_eq!(roles[1].name, "role");
    }

    #[tokio::test]
    async fn list_grows_with_each_create() {
        let (controller, _) = controller();
        assert!(controller.list(&meta(), &Params::new()).await.unwrap().is_empty());

        for name in ["a", "b", "c"] {
            controller.create(&meta(), &params(&[("name", name)])).await.unwrap();
        }
        assert_eq!(controller.list(&meta(), &Params::new()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_persists_and_returns_the_role() {
        let (controller, repo) = controller();
        let role = controller
            .create(&meta(), &params(&[("name", "Test Role")]))
            .await
            .unwrap();

        assert_ne!(role.id, 0);
        assert_eq!(role.name, "Test Role");
        assert_eq!(repo.find_by_id(role.id).await.unwrap(), Some(role));
    }

    #[tokio::test]
    async fn create_requires_name() {
        let (controller, _) = controller();
        let err = controller.create(&meta(), &Params::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name_without_inserting() {
        let (controller, repo) = controller();
        repo.insert(Role::new("dupe-role")).await.unwrap();

        let err = controller
            .create(&meta(), &params(&[("name", "dupe-role")]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is already in use");
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn read_returns_the_stored_role() {
        let (controller, repo) = controller();
        let stored = repo.insert(Role::new("Test Role")).await.unwrap();

        let role = controller
            .read(&meta(), &params(&[("id", stored.id.to_string().as_str())]))
            .await
            .unwrap();
        assert_eq!(role, stored);
    }

    #[tokio::test]
    async fn read_update_delete_require_id() {
        let (controller, repo) = controller();
        repo.insert(Role::new("Test Role")).await.unwrap();
        let p = params(&[("rolename", "newrolename")]);

        for err in [
            controller.read(&meta(), &p).await.unwrap_err(),
            controller.update(&meta(), &p).await.unwrap_err(),
        ] {
            assert_eq!(err.to_string(), "id is required");
        }
        let err = controller.delete(&meta(), &p).await.unwrap_err();
        assert_eq!(err.to_string(), "id is required");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (controller, repo) = controller();
        repo.insert(Role::new("Test Role")).await.unwrap();
        let p = params(&[("id", "999"), ("name", "x")]);

        assert!(matches!(controller.read(&meta(), &p).await, Err(ControllerError::NotFound)));
        assert!(matches!(controller.update(&meta(), &p).await, Err(ControllerError::NotFound)));
        assert!(matches!(controller.delete(&meta(), &p).await, Err(ControllerError::NotFound)));
        assert_eq!(repo.find_all().await.unwrap()[0].name, "Test Role");
    }

    #[tokio::test]
    async fn update_overwrites_present_fields() {
        let (controller, repo) = controller();
        let stored = repo.insert(Role::new("Test Role")).await.unwrap();

        let role = controller
            .update(
                &meta(),
                &params(&[("id", stored.id.to_string().as_str()), ("name", "Updated Role")]),
            )
            .await
            .unwrap();
        assert_eq!(role.id, stored.id);
        assert_eq!(role.name, "Updated Role");
        assert_eq!(repo.find_by_id(stored.id).await.unwrap().unwrap().name, "Updated Role");
    }

    #[tokio::test]
    async fn update_without_name_keeps_old_value() {
        let (controller, repo) = controller();
        let stored = repo.insert(Role::new("Test Role")).await.unwrap();

        let role = controller
            .update(&meta(), &params(&[("id", stored.id.to_string().as_str())]))
            .await
            .unwrap();
        assert_eq!(role.name, "Test Role");
    }

    #[tokio::test]
    async fn update_does_not_recheck_uniqueness() {
        let (controller, repo) = controller();
        repo.insert(Role::new("Admin")).await.unwrap();
        let other = repo.insert(Role::new("Guest")).await.unwrap();

        let role = controller
            .update(&meta(), &params(&[("id", other.id.to_string().as_str()), ("name", "Admin")]))
            .await
            .unwrap();
        assert_eq!(role.name, "Admin");
    }

    #[tokio::test]
    async fn delete_confirms_and_removes() {
        let (controller, repo) = controller();
        let stored = repo.insert(Role::new("Test Role")).await.unwrap();
        let p = params(&[("id", stored.id.to_string().as_str())]);

        assert_eq!(controller.delete(&meta(), &p).await.unwrap(), "role deleted");
        let err = controller.read(&meta(), &p).await.unwrap_err();
        assert_eq!(err.to_string(), "resource not found");
    }

    #[tokio::test]
    async fn admin_role_lifecycle() {
        let (controller, _) = controller();

        let admin = controller
            .create(&meta(), &params(&[("name", "Admin")]))
            .await
            .unwrap();
        assert_ne!(admin.id, 0);
        assert_eq!(admin.name, "Admin");

        let err = controller
            .create(&meta(), &params(&[("name", "Admin")]))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is already in use");

        let id = admin.id.to_string();
        let blanked = controller
            .update(&meta(), &params(&[("id", id.as_str()), ("name", "")]))
            .await
            .unwrap();
        assert_eq!(blanked.name, "");

        let msg = controller.delete(&meta(), &params(&[("id", id.as_str())])).await.unwrap();
        assert_eq!(msg, "role deleted");

        let err = controller.read(&meta(), &params(&[("id", id.as_str())])).await.unwrap_err();
        assert_eq!(err.to_string(), "resource not found");
    }

    #[tokio::test]
    async fn write_faults_after_lookup_pass_through_unchanged() {
        let inner = MemoryRepository::<Role>::new();
        let stored = inner.insert(Role::new("Admin")).await.unwrap();
        let store = Arc::new(FailingWrites::new(inner));
        let controller = RoleController::new(store.clone());
        let expected = sqlx::Error::PoolTimedOut.to_string();
        let id = stored.id.to_string();

        let err = controller
            .create(&meta(), &params(&[("name", "Guest")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Store(StoreError::Database(_))));
        assert_eq!(err.to_string(), expected);

        let err = controller
            .update(&meta(), &params(&[("id", id.as_str()), ("name", "Root")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::Store(StoreError::Database(_))));
        assert_eq!(err.to_string(), expected);
        assert_eq!(store.inner.find_by_id(stored.id).await.unwrap(), Some(stored.clone()));

        let err = controller.delete(&meta(), &params(&[("id", id.as_str())])).await.unwrap_err();
        assert!(matches!(err, ControllerError::Store(StoreError::Database(_))));
        assert_eq!(err.to_string(), expected);
        assert_eq!(store.inner.find_all().await.unwrap().len(), 1);
    }
}
