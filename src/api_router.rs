use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::core::middleware::auth_middleware;
use crate::core::shared::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .merge(crate::dashboard::configure_dashboard_routes())
        .merge(crate::properties::configure_property_routes())
        .merge(crate::owners::configure_owner_routes())
        .merge(crate::actions::configure_action_routes())
        .merge(crate::analytics::configure_analytics_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(handle_health))
        .merge(protected)
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
