use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{debug, info};

use super::{ApiContext, ApiError, cors_headers};
use crate::auth::{Actor, Session};
use crate::blob::BlobError;
use crate::model::NewProperty;

pub(super) async fn preflight() -> impl IntoResponse {
    (cors_headers(), "ok")
}

enum Caller {
    ApiKey,
    Session(Session),
}

fn authenticate(ctx: &ApiContext, headers: &HeaderMap) -> Result<Caller, ApiError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".into()))?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    if ctx.api_key.as_deref().is_some_and(|key| key == token) {
        return Ok(Caller::ApiKey);
    }
    let invalid = || ApiError::Unauthorized("Invalid authorization token".into());
    let jwt = ctx.jwt.as_ref().ok_or_else(invalid)?;
    jwt.verify(token).map(Caller::Session).map_err(|e| {
        debug!(error = %e, "rejected webhook token");
        invalid()
    })
}

pub(super) async fn add_property(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let caller = authenticate(&ctx, &headers)?;
    let mut input: NewProperty = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    if input.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title is required".into()));
    }

    let actor = match caller {
        Caller::ApiKey => {
            let agent_id = input.agent_id.ok_or_else(|| {
                ApiError::BadRequest("agent_id is required when using API key".into())
            })?;
            Actor::Agent(agent_id)
        }
        Caller::Session(session) => {
            // The session user is always the listing agent here.
            input.agent_id = Some(session.user_id);
            Actor::from_session(&session)
        }
    };

    let saved = ctx.services.properties.create(&actor, input).await?;
    info!(id = %saved.id, actor = %actor.id(), "property added via webhook");
    Ok((
        StatusCode::CREATED,
        cors_headers(),
        Json(json!({
            "success": true,
            "message": "Property added successfully",
            "data": saved,
        })),
    ))
}

fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub(super) async fn public_object(
    State(ctx): State<ApiContext>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let blobs = ctx
        .blobs
        .as_ref()
        .ok_or_else(|| ApiError::Blob(BlobError::NotFound(path.clone())))?;
    let bytes = blobs.read(&path).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], bytes))
}
