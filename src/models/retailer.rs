use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::{validate_text, MAX_LOCATION_LEN, MAX_NAME_LEN};

/// A retailer account that browses the product catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Retailer {
    pub retailer_id: i64,
    pub name: String,
    pub location: String,
    pub last_login: Option<DateTime<Utc>>,
}

/// Payload for registering a retailer
#[derive(Debug, Clone, Deserialize)]
pub struct NewRetailer {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl NewRetailer {
    pub fn validate(&self) -> AppResult<()> {
        validate_text("Retailer name", &self.name, MAX_NAME_LEN)?;
        validate_text("Retailer location", &self.location, MAX_LOCATION_LEN)
    }

    /// Materializes the payload under a store-assigned id
    pub fn into_retailer(self, retailer_id: i64) -> Retailer {
        Retailer {
            retailer_id,
            name: self.name,
            location: self.location,
            last_login: self.last_login,
        }
    }
}
