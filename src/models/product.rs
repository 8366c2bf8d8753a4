use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{validate_text, MAX_LABEL_LEN, MAX_NAME_LEN};

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    /// Free-form attributes (pack size, unit, ...)
    pub product_metadata: Value,
}

/// Payload for adding a product to the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    #[serde(default = "empty_metadata")]
    pub product_metadata: Value,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

impl NewProduct {
    pub fn validate(&self) -> AppResult<()> {
        validate_text("Product name", &self.name, MAX_NAME_LEN)?;
        validate_text("Product category", &self.category, MAX_LABEL_LEN)?;
        validate_text("Product brand", &self.brand, MAX_LABEL_LEN)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Product price must be a non-negative number, got {}",
                self.price
            )));
        }
        Ok(())
    }

    pub fn into_product(self, product_id: i64) -> Product {
        Product {
            product_id,
            name: self.name,
            category: self.category,
            brand: self.brand,
            price: self.price,
            product_metadata: self.product_metadata,
        }
    }
}

/// Rule-based recommendation entry: a product ranked by the retailer's own views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct PopularProduct {
    pub product_id: i64,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub view_count: i64,
}

/// Product enriched for the collaborative-filtering response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    pub product_id: i64,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub metadata: Value,
}

impl From<Product> for ProductDetails {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name,
            brand: product.brand,
            category: product.category,
            price: product.price,
            metadata: product.product_metadata,
        }
    }
}
