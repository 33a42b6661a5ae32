pub mod storage;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;

pub use storage::{ActionListQuery, ActionStore};
pub use types::{
    ActionItem, ActionStatus, ActionType, CompleteActionRequest, CreateActionRequest,
    RescheduleActionRequest,
};

pub fn configure_action_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/actions", get(handle_list_actions))
        .route("/api/actions", post(handle_create_action))
        .route("/api/actions/:id", get(handle_get_action))
        .route("/api/actions/:id/complete", post(handle_complete_action))
        .route("/api/actions/:id/skip", post(handle_skip_action))
        .route("/api/actions/:id/reschedule", post(handle_reschedule_action))
        .route("/api/actions/:id/reopen", post(handle_reopen_action))
}

pub async fn handle_list_actions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActionListQuery>,
) -> Result<Json<Vec<ActionItem>>, ApiError> {
    Ok(Json(state.actions.list(query).await?))
}

pub async fn handle_create_action(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateActionRequest>,
) -> Result<(StatusCode, Json<ActionItem>), ApiError> {
    let action = state.actions.create(request).await?;
    Ok((StatusCode::CREATED, Json(action)))
}

pub async fn handle_get_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionItem>, ApiError> {
    Ok(Json(state.actions.find_by_id(id).await?))
}

pub async fn handle_complete_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    request: Option<Json<CompleteActionRequest>>,
) -> Result<Json<ActionItem>, ApiError> {
    let result = request.and_then(|Json(r)| r.result);
    Ok(Json(state.actions.complete(id, result).await?))
}

pub async fn handle_skip_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    request: Option<Json<CompleteActionRequest>>,
) -> Result<Json<ActionItem>, ApiError> {
    let result = request.and_then(|Json(r)| r.result);
    Ok(Json(state.actions.skip(id, result).await?))
}

pub async fn handle_reschedule_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleActionRequest>,
) -> Result<Json<ActionItem>, ApiError> {
    Ok(Json(
        state.actions.reschedule(id, request.scheduled_date).await?,
    ))
}

pub async fn handle_reopen_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ActionItem>, ApiError> {
    Ok(Json(state.actions.reopen(id).await?))
}
