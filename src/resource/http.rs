use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::error;

use super::{extract::ResourceRequest, ResourceController};
use crate::error::ControllerError;
use crate::store::Entity;

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ControllerError::Required(_) => StatusCode::BAD_REQUEST,
            ControllerError::InUse(_) => StatusCode::CONFLICT,
            ControllerError::NotFound => StatusCode::NOT_FOUND,
            ControllerError::Store(e) => {
                error!(error = %e, "store fault");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}

/// Mounts `controller` at `/{C::NAME}` and `/{C::NAME}/:id`.
pub fn resource_router<C, S>(controller: Arc<C>) -> Router<S>
where
    C: ResourceController,
    S: Clone + Send + Sync + 'static,
{
    let base = format!("/{}", C::NAME);
    let item = format!("/{}/:id", C::NAME);
    Router::new()
        .route(&base, get(list::<C>).post(create::<C>))
        .route(&item, get(read::<C>).put(update::<C>).delete(delete::<C>))
        .with_state(controller)
}

async fn list<C: ResourceController>(
    State(controller): State<Arc<C>>,
    req: ResourceRequest,
) -> Result<Json<Vec<C::Model>>, ControllerError> {
    let rows = controller.list(&req.meta, &req.params).await?;
    Ok(Json(rows))
}

async fn create<C: ResourceController>(
    State(controller): State<Arc<C>>,
    req: ResourceRequest,
) -> Result<(StatusCode, HeaderMap, Json<C::Model>), ControllerError> {
    let created = controller.create(&req.meta, &req.params).await?;

    let mut headers = HeaderMap::new();
    let location = format!("/{}/{}", C::NAME, created.id());
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(LOCATION, value);
    }

    Ok((StatusCode::CREATED, headers, Json(created)))
}

async fn read<C: ResourceController>(
    State(controller): State<Arc<C>>,
    req: ResourceRequest,
) -> Result<Json<C::Model>, ControllerError> {
    controller.read(&req.meta, &req.params).await.map(Json)
}

async fn update<C: ResourceController>(
    State(controller): State<Arc<C>>,
    req: ResourceRequest,
) -> Result<Json<C::Model>, ControllerError> {
    controller.update(&req.meta, &req.params).await.map(Json)
}

async fn delete<C: ResourceController>(
    State(controller): State<Arc<C>>,
    req: ResourceRequest,
) -> Result<Json<String>, ControllerError> {
    controller.delete(&req.meta, &req.params).await.map(Json)
}
