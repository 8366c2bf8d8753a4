use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{NewProduct, NewRetailer, Product, Retailer},
    routes::AppState,
};

/// Handler for registering a retailer
pub async fn create_retailer(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewRetailer>,
) -> AppResult<(StatusCode, Json<Retailer>)> {
    request.validate()?;

    let retailer = state.store.create_retailer(request).await?;

    tracing::info!(
        request_id = %request_id,
        retailer_id = retailer.retailer_id,
        "Retailer created"
    );

    Ok((StatusCode::CREATED, Json(retailer)))
}

/// Handler for adding a catalog product
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    request.validate()?;

    let product = state.store.create_product(request).await?;

    tracing::info!(
        request_id = %request_id,
        product_id = product.product_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product)))
}
