use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Kind of retailer activity recorded against a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    View,
    Search,
    AddToCart,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::View => "view",
            ActionType::Search => "search",
            ActionType::AddToCart => "add_to_cart",
        }
    }
}

impl Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(ActionType::View),
            "search" => Ok(ActionType::Search),
            "add_to_cart" => Ok(ActionType::AddToCart),
            other => Err(AppError::InvalidInput(format!(
                "Unknown action type: {}",
                other
            ))),
        }
    }
}

/// A recorded retailer/product interaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub interaction_id: i64,
    pub retailer_id: i64,
    pub product_id: i64,
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
}

/// Payload for recording an interaction; the timestamp defaults to now
#[derive(Debug, Clone, Deserialize)]
pub struct NewInteraction {
    pub retailer_id: i64,
    pub product_id: i64,
    pub action_type: ActionType,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl NewInteraction {
    pub fn into_interaction(self, interaction_id: i64) -> Interaction {
        Interaction {
            interaction_id,
            retailer_id: self.retailer_id,
            product_id: self.product_id,
            action_type: self.action_type,
            timestamp: self.timestamp,
        }
    }
}
