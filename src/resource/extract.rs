use std::collections::HashMap;

use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Params, RequestMeta};

const REQUEST_ID_HEADER: &str = "x-request-id";
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Request metadata plus the flattened parameter map.
///
/// Sources are merged body first, then query string, then path captures, so
/// the `id` from the path always wins.
pub struct ResourceRequest {
    pub meta: RequestMeta,
    pub params: Params,
}

#[async_trait]
impl<S> FromRequest<S> for ResourceRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let mut meta = RequestMeta::new(parts.method.clone(), parts.uri.path());
        if let Some(request_id) = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
        {
            meta.request_id = request_id;
        }

        // Collection routes have no captures; that is not an error here.
        let path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(p)| p)
            .unwrap_or_default();
        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| (e.status(), e.body_text()))?;

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body = to_bytes(body, BODY_LIMIT)
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        // An empty body contributes no params, whatever its content type.
        let mut params = if body.is_empty() {
            Params::new()
        } else if content_type.starts_with("application/json") {
            let req = Request::from_parts(parts, Body::from(body));
            let Json(object) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| (e.status(), e.body_text()))?;
            flatten_json(object)?
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let req = Request::from_parts(parts, Body::from(body));
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| (e.status(), e.body_text()))?;
            fields
        } else {
            Params::new()
        };

        params.extend(query);
        params.extend(path);

        Ok(Self { meta, params })
    }
}

/// Turns a JSON object into a flat string map. `null` counts as absent.
fn flatten_json(object: Map<String, Value>) -> Result<Params, (StatusCode, String)> {
    let mut params = Params::with_capacity(object.len());
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("{key} must be a string, number or boolean"),
                ));
            }
        };
        params.insert(key, text);
    }
    Ok(params)
}
