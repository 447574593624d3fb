use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::api::DefectsApi;
use crate::error::DefectError;
use crate::model::{Defect, DefectPatch, NewDefect};
use crate::store::DataStore;

/// An error on its way out to the client: a status plus a message rendered
/// as `{ "message": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<DefectError> for ApiError {
    fn from(err: DefectError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: DefectError::InvalidRequest(rejection.body_text()).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            tracing::warn!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

type HandlerResult<T> = Result<T, ApiError>;

/// Run `op` against the locked API on the blocking pool. Store access is
/// synchronous file I/O, which must not run on a runtime worker.
async fn with_api<S, T, F>(state: Arc<AppState<S>>, op: F) -> HandlerResult<T>
where
    S: DataStore + Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut DefectsApi<S>) -> crate::error::Result<T> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || {
        let mut api = state.lock()?;
        op(&mut *api)
    })
    .await
    .map_err(|e| DefectError::Store(format!("request task failed: {}", e)))?;
    Ok(outcome?)
}

/// `POST /api/defects`
pub(super) async fn create_defect<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<NewDefect>, JsonRejection>,
) -> HandlerResult<(StatusCode, Json<Defect>)> {
    let Json(input) = body?;
    tracing::info!(
        id = input.defect_id.as_deref().unwrap_or(""),
        "processing defect submission"
    );
    let created = with_api(state, move |api| api.create_defect(input)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/defects`
pub(super) async fn list_defects<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> HandlerResult<Json<Vec<Defect>>> {
    let defects = with_api(state, |api| Ok(api.list_defects())).await?;
    Ok(Json(defects))
}

/// `GET /api/defects/:id`
pub(super) async fn get_defect<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> HandlerResult<Json<Defect>> {
    let defect = with_api(state, move |api| api.get_defect(&id)).await?;
    Ok(Json(defect))
}

/// `PUT /api/defects/:id`
pub(super) async fn update_defect<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    body: Result<Json<DefectPatch>, JsonRejection>,
) -> HandlerResult<Json<Defect>> {
    let Json(patch) = body?;
    let updated = with_api(state, move |api| api.update_defect(&id, patch)).await?;
    Ok(Json(updated))
}

/// `GET /api/images/:filename`
pub(super) async fn get_image<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(filename): Path<String>,
) -> HandlerResult<Response> {
    let bytes = with_api(state, move |api| api.image(&filename)).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// `GET /api/health`
pub(super) async fn health<S: DataStore + Send + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> HandlerResult<Json<serde_json::Value>> {
    let count = with_api(state, |api| Ok(api.defect_count())).await?;
    Ok(Json(json!({ "ok": true, "defects": count })))
}

pub(super) async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "Not found".to_string(),
    }
}
