use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Interaction, NewInteraction, ViewEvent},
    routes::AppState,
};

/// Handler for recording a retailer interaction
pub async fn create_interaction(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewInteraction>,
) -> AppResult<(StatusCode, Json<Interaction>)> {
    let interaction = state.store.create_interaction(request).await?;

    tracing::info!(
        request_id = %request_id,
        interaction_id = interaction.interaction_id,
        retailer_id = interaction.retailer_id,
        product_id = interaction.product_id,
        action_type = %interaction.action_type,
        "Interaction recorded"
    );

    Ok((StatusCode::CREATED, Json(interaction)))
}

/// Handler exporting every view event as `{retailer_id, product_id}` pairs
pub async fn export(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ViewEvent>>> {
    let events = state.store.view_events().await?;
    tracing::debug!(count = events.len(), "Exported view events");
    Ok(Json(events))
}
