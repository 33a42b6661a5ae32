pub mod storage;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;

pub use storage::{PropertyListQuery, PropertyStore};
pub use types::{CreatePropertyRequest, Property, UpdatePropertyRequest};

pub fn configure_property_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/properties", get(handle_list_properties))
        .route("/api/properties", post(handle_create_property))
        .route("/api/properties/:id", get(handle_get_property))
        .route("/api/properties/:id", put(handle_update_property))
        .route(
            "/api/properties/:id/owners/:owner_id",
            post(handle_link_owner),
        )
        .route(
            "/api/properties/:id/owners/:owner_id",
            delete(handle_unlink_owner),
        )
}

pub async fn handle_list_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PropertyListQuery>,
) -> Result<Json<Vec<Property>>, ApiError> {
    Ok(Json(state.properties.list(query).await?))
}

pub async fn handle_create_property(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    let property = state.properties.create(request).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn handle_get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>, ApiError> {
    Ok(Json(state.properties.find_by_id(id).await?))
}

pub async fn handle_update_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePropertyRequest>,
) -> Result<Json<Property>, ApiError> {
    Ok(Json(state.properties.update(id, request).await?))
}

pub async fn handle_link_owner(
    State(state): State<Arc<AppState>>,
    Path((id, owner_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.properties.link_owner(id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_unlink_owner(
    State(state): State<Arc<AppState>>,
    Path((id, owner_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.properties.unlink_owner(id, owner_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
