use crate::{
    error::AppResult,
    models::{
        Interaction, NewInteraction, NewProduct, NewRetailer, PopularProduct, Product, Retailer,
        ViewEvent,
    },
};

/// Persistence for retailers, products and their interactions
///
/// Handlers receive an implementation through `AppState`, so the same routes
/// run against PostgreSQL in production and an in-process store in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn create_retailer(&self, retailer: NewRetailer) -> AppResult<Retailer>;

    async fn create_product(&self, product: NewProduct) -> AppResult<Product>;

    /// Records an interaction; unknown retailer or product ids are `NotFound`
    async fn create_interaction(&self, interaction: NewInteraction) -> AppResult<Interaction>;

    /// Products the retailer viewed most, by view count descending then product id
    async fn popular_products(
        &self,
        retailer_id: i64,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PopularProduct>>;

    /// Every `view` interaction in recording order
    async fn view_events(&self) -> AppResult<Vec<ViewEvent>>;

    /// Catalog lookup; missing ids are skipped and order is unspecified
    async fn products_by_ids(&self, product_ids: &[i64]) -> AppResult<Vec<Product>>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}
