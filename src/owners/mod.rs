pub mod storage;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;

pub use storage::{OwnerListQuery, OwnerStore};
pub use types::{CreateOwnerRequest, PropertyOwner, SegmentCategory, UpdateOwnerRequest};

pub fn configure_owner_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/owners", get(handle_list_owners))
        .route("/api/owners", post(handle_create_owner))
        .route("/api/owners/:id", get(handle_get_owner))
        .route("/api/owners/:id", put(handle_update_owner))
}

pub async fn handle_list_owners(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerListQuery>,
) -> Result<Json<Vec<PropertyOwner>>, ApiError> {
    Ok(Json(state.owners.list(query).await?))
}

pub async fn handle_create_owner(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOwnerRequest>,
) -> Result<(StatusCode, Json<PropertyOwner>), ApiError> {
    let owner = state.owners.create(request).await?;
    Ok((StatusCode::CREATED, Json(owner)))
}

pub async fn handle_get_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyOwner>, ApiError> {
    Ok(Json(state.owners.find_by_id(id).await?))
}

pub async fn handle_update_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOwnerRequest>,
) -> Result<Json<PropertyOwner>, ApiError> {
    Ok(Json(state.owners.update(id, request).await?))
}
