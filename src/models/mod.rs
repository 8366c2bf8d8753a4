use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

mod interaction;
mod product;
mod retailer;

pub use interaction::{ActionType, Interaction, NewInteraction};
pub use product::{NewProduct, PopularProduct, Product, ProductDetails};
pub use retailer::{NewRetailer, Retailer};

pub use crate::services::recommender::ViewEvent;

/// Shown when collaborative filtering has nothing to offer yet
pub const NO_RECOMMENDATIONS_MESSAGE: &str =
    "No recommendations available yet. Try interacting with more products!";

/// Column widths from the catalog migration
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_LOCATION_LEN: usize = 100;
pub const MAX_LABEL_LEN: usize = 50;

/// Rejects blank text and text wider than its VARCHAR column
///
/// Width is counted in characters, as Postgres does.
pub(crate) fn validate_text(field: &str, value: &str, max_chars: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} must not be blank",
            field
        )));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}

/// Rule-based recommendations for a retailer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub retailer_id: i64,
    pub recommendations: Vec<PopularProduct>,
}

/// Collaborative-filtering recommendations for a retailer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MlRecommendationResponse {
    pub retailer_id: i64,
    pub ml_recommendations: Vec<ProductDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MlRecommendationResponse {
    /// Friendly empty state instead of an error
    pub fn empty(retailer_id: i64) -> Self {
        Self {
            retailer_id,
            ml_recommendations: Vec::new(),
            message: Some(NO_RECOMMENDATIONS_MESSAGE.to_string()),
        }
    }
}
