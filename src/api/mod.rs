//! HTTP surface: the property-creation webhook and public image reads.
pub mod error;
mod handlers;
#[cfg(test)]
mod tests;

use anyhow::Result;
use axum::Router;
use axum::http::{HeaderName, header};
use axum::routing::{get, post};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use error::ApiError;

use crate::auth::JwtAuthority;
use crate::blob::BlobStore;
use crate::service::Services;

pub const ADD_PROPERTY_PATH: &str = "/functions/v1/add-property";
pub const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public";

const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

pub(crate) fn cors_headers() -> [(HeaderName, &'static str); 2] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
    ]
}

#[derive(Clone)]
pub struct ApiContext {
    pub services: Arc<Services>,
    pub jwt: Option<JwtAuthority>,
    /// Shared key for machine callers; they must name the agent in the body.
    pub api_key: Option<String>,
    pub blobs: Option<Arc<dyn BlobStore>>,
}

pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route(
            ADD_PROPERTY_PATH,
            post(handlers::add_property).options(handlers::preflight),
        )
        .route(
            &format!("{PUBLIC_OBJECT_PREFIX}/*path"),
            get(handlers::public_object),
        )
        .with_state(ctx)
}

/// Serves until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    ctx: ApiContext,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "webhook server listening");
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("webhook server stopped");
    Ok(())
}
