use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{Cache, InteractionStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::SimilarityRecommender,
};

pub mod catalog;
pub mod interactions;
pub mod recommendations;

/// Dependencies shared by every handler
///
/// Storage and cache are injected so each deployment (or test) decides the
/// backends; nothing here is a global.
pub struct AppState {
    pub store: Arc<dyn InteractionStore>,
    pub cache: Cache,
    pub recommender: SimilarityRecommender,
    /// Expiry for cached recommendation responses, in seconds
    pub cache_ttl: u64,
}

impl AppState {
    pub fn new(
        store: Arc<dyn InteractionStore>,
        cache: Cache,
        recommender: SimilarityRecommender,
        cache_ttl: u64,
    ) -> Self {
        Self {
            store,
            cache,
            recommender,
            cache_ttl,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/retailers", post(catalog::create_retailer))
        .route("/retailers/", post(catalog::create_retailer))
        .route("/products", post(catalog::create_product))
        .route("/products/", post(catalog::create_product))
        .route("/interactions", post(interactions::create_interaction))
        .route("/interactions/", post(interactions::create_interaction))
        .route("/interactions/export", get(interactions::export))
        .route(
            "/recommendations/:retailer_id",
            get(recommendations::popular),
        )
        .route(
            "/ml_recommendations/:retailer_id",
            get(recommendations::similar),
        )
        .layer(
            // Outermost first: the request id must exist before the trace span is made
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the retailer recommendation service!" }))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
