use std::collections::HashMap;
use std::time::Instant;

use crate::{
    cached,
    db::{Cache, CacheKey, InteractionStore},
    error::{AppError, AppResult},
    models::{MlRecommendationResponse, ProductDetails, RecommendationResponse},
    services::recommender::SimilarityRecommender,
};

/// Largest page the rule-based endpoint will serve
pub const MAX_LIMIT: i64 = 100;

/// Rule-based recommendations: the retailer's most viewed products
///
/// Served from cache when a response for the same retailer and page exists.
pub async fn popular_products(
    store: &dyn InteractionStore,
    cache: &Cache,
    ttl: u64,
    retailer_id: i64,
    limit: i64,
    offset: i64,
) -> AppResult<RecommendationResponse> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    if offset < 0 {
        return Err(AppError::InvalidInput(
            "offset must not be negative".to_string(),
        ));
    }

    let key = CacheKey::Popular {
        retailer_id,
        limit,
        offset,
    };

    cached!(cache, key, ttl, async {
        let recommendations = store.popular_products(retailer_id, limit, offset).await?;
        tracing::info!(
            retailer_id = retailer_id,
            count = recommendations.len(),
            "Computed popular products"
        );
        Ok::<_, AppError>(RecommendationResponse {
            retailer_id,
            recommendations,
        })
    })
}

/// Collaborative-filtering recommendations enriched with catalog details
///
/// The engine runs on the blocking pool since it is pure CPU work over the
/// full view history. Empty results are returned with a friendly message and
/// are not cached, so new interactions show up on the next request.
pub async fn similar_products(
    store: &dyn InteractionStore,
    cache: &Cache,
    ttl: u64,
    recommender: SimilarityRecommender,
    retailer_id: i64,
) -> AppResult<MlRecommendationResponse> {
    let key = CacheKey::Similar(retailer_id);
    if let Some(cached) = cache.get_from_cache(&key).await? {
        return Ok(cached);
    }

    let start = Instant::now();
    let events = store.view_events().await?;
    let event_count = events.len();

    let product_ids =
        tokio::task::spawn_blocking(move || recommender.recommend(retailer_id, &events))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

    if product_ids.is_empty() {
        tracing::info!(
            retailer_id = retailer_id,
            events = event_count,
            "No similarity recommendations available"
        );
        return Ok(MlRecommendationResponse::empty(retailer_id));
    }

    let ml_recommendations = enrich(store, &product_ids).await?;

    tracing::info!(
        retailer_id = retailer_id,
        events = event_count,
        candidates = product_ids.len(),
        returned = ml_recommendations.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Computed similarity recommendations"
    );

    let response = MlRecommendationResponse {
        retailer_id,
        ml_recommendations,
        message: None,
    };
    cache.set_in_background(&key, &response, ttl);
    Ok(response)
}

/// Looks up catalog records, keeping recommendation order
async fn enrich(store: &dyn InteractionStore, product_ids: &[i64]) -> AppResult<Vec<ProductDetails>> {
    let mut by_id: HashMap<i64, ProductDetails> = store
        .products_by_ids(product_ids)
        .await?
        .into_iter()
        .map(|p| (p.product_id, ProductDetails::from(p)))
        .collect();

    let details: Vec<ProductDetails> = product_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    if details.len() < product_ids.len() {
        tracing::warn!(
            missing = product_ids.len() - details.len(),
            "Recommended products missing from catalog, skipping"
        );
    }

    Ok(details)
}
