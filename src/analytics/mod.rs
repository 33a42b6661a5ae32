pub mod storage;
pub mod types;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;

pub use storage::{AnalyticsRangeQuery, AnalyticsStore};
pub use types::{AnalyticsSnapshot, UpsertAnalyticsRequest};

pub fn configure_analytics_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics", get(handle_list_analytics))
        .route("/api/analytics/:date", get(handle_get_analytics))
        .route("/api/analytics/:date", put(handle_upsert_analytics))
}

pub async fn handle_list_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsRangeQuery>,
) -> Result<Json<Vec<AnalyticsSnapshot>>, ApiError> {
    Ok(Json(state.analytics.list(query).await?))
}

pub async fn handle_get_analytics(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<AnalyticsSnapshot>, ApiError> {
    Ok(Json(state.analytics.find_by_date(date).await?))
}

pub async fn handle_upsert_analytics(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
    Json(request): Json<UpsertAnalyticsRequest>,
) -> Result<Json<AnalyticsSnapshot>, ApiError> {
    Ok(Json(state.analytics.upsert(date, request).await?))
}
