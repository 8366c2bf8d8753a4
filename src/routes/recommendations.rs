use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{MlRecommendationResponse, RecommendationResponse},
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    5
}

/// Handler for rule-based recommendations
pub async fn popular(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(retailer_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        retailer_id = retailer_id,
        limit = page.limit,
        offset = page.offset,
        "Fetching popular product recommendations"
    );

    let response = recommendations::popular_products(
        state.store.as_ref(),
        &state.cache,
        state.cache_ttl,
        retailer_id,
        page.limit,
        page.offset,
    )
    .await?;

    Ok(Json(response))
}

/// Handler for collaborative-filtering recommendations
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(retailer_id): Path<i64>,
) -> AppResult<Json<MlRecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        retailer_id = retailer_id,
        "Fetching ML recommendations"
    );

    let response = recommendations::similar_products(
        state.store.as_ref(),
        &state.cache,
        state.cache_ttl,
        state.recommender,
        retailer_id,
    )
    .await?;

    Ok(Json(response))
}
