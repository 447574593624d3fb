//! HTTP transport — maps the REST surface onto [`DefectsApi`].
//!
//! ## Routes
//!
//! - `POST /api/defects` — create; 201 with the stored record.
//! - `GET /api/defects` — list every record.
//! - `GET /api/defects/:id` — one record.
//! - `PUT /api/defects/:id` — partial update.
//! - `GET <image route>/:filename` — raw image bytes (`/api/images` by default).
//! - `GET /api/health` — `{ "ok": true, "defects": <count> }`.
//!
//! Errors are JSON bodies of the form `{ "message": "..." }`.
//!
//! The API sits behind one mutex. Each handler does its synchronous
//! mutate-and-save work while holding it, which serializes writers and rules
//! out lost updates between concurrent requests. That work runs on tokio's
//! blocking pool so large image reads and writes do not stall the runtime.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};

use crate::api::DefectsApi;
use crate::config::{check_route_prefix, ServerConfig};
use crate::error::{DefectError, Result};
use crate::store::DataStore;

mod handlers;
mod middleware;

pub use handlers::ApiError;

pub struct AppState<S: DataStore> {
    api: Mutex<DefectsApi<S>>,
}

impl<S: DataStore> AppState<S> {
    pub fn new(api: DefectsApi<S>) -> Self {
        Self {
            api: Mutex::new(api),
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, DefectsApi<S>>> {
        self.api
            .lock()
            .map_err(|_| DefectError::Store("defect store lock poisoned".to_string()))
    }
}

/// Build the axum `Router` serving `api` with the given server settings.
///
/// Fails with a config error when the image route or CORS origin cannot be
/// mounted, rather than panicking inside axum.
pub fn router<S: DataStore + Send + 'static>(
    api: DefectsApi<S>,
    server: &ServerConfig,
) -> Result<Router> {
    check_route_prefix(api.image_route())?;
    let cors_origin = server.cors_origin()?;
    let image_route = format!("{}/:filename", api.image_route().trim_end_matches('/'));
    let state = Arc::new(AppState::new(api));

    let app = Router::new()
        .route(
            "/api/defects",
            get(handlers::list_defects::<S>).post(handlers::create_defect::<S>),
        )
        .route(
            "/api/defects/:id",
            get(handlers::get_defect::<S>).put(handlers::update_defect::<S>),
        )
        .route(&image_route, get(handlers::get_image::<S>))
        .route("/api/health", get(handlers::health::<S>))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(axum_middleware::from_fn(middleware::request_tracing))
        .layer(axum_middleware::from_fn_with_state(
            cors_origin,
            middleware::cors,
        ));
    Ok(app)
}

/// Serve `api` on the configured address until Ctrl-C.
pub async fn serve<S: DataStore + Send + 'static>(
    api: DefectsApi<S>,
    server: &ServerConfig,
) -> Result<()> {
    let app = router(api, server)?;
    let listener = tokio::net::TcpListener::bind(server.addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "server is running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
