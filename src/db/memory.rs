use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::{
    db::{CacheBackend, InteractionStore},
    error::{AppError, AppResult},
    models::{
        ActionType, Interaction, NewInteraction, NewProduct, NewRetailer, PopularProduct, Product,
        Retailer, ViewEvent,
    },
};

/// In-process [`InteractionStore`] for tests and database-less runs
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    retailers: BTreeMap<i64, Retailer>,
    products: BTreeMap<i64, Product>,
    interactions: Vec<Interaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Ids start at 1, like a fresh sequence
fn next_id<V>(map: &BTreeMap<i64, V>) -> i64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

#[async_trait::async_trait]
impl InteractionStore for MemoryStore {
    async fn create_retailer(&self, retailer: NewRetailer) -> AppResult<Retailer> {
        let mut inner = self.inner.write().await;
        let retailer = retailer.into_retailer(next_id(&inner.retailers));
        inner
            .retailers
            .insert(retailer.retailer_id, retailer.clone());
        Ok(retailer)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let mut inner = self.inner.write().await;
        let product = product.into_product(next_id(&inner.products));
        inner.products.insert(product.product_id, product.clone());
        Ok(product)
    }

    async fn create_interaction(&self, interaction: NewInteraction) -> AppResult<Interaction> {
        let mut inner = self.inner.write().await;

        if !inner.retailers.contains_key(&interaction.retailer_id) {
            return Err(AppError::NotFound(format!(
                "Retailer {} does not exist",
                interaction.retailer_id
            )));
        }
        if !inner.products.contains_key(&interaction.product_id) {
            return Err(AppError::NotFound(format!(
                "Product {} does not exist",
                interaction.product_id
            )));
        }

        let interaction_id = inner.interactions.len() as i64 + 1;
        let interaction = interaction.into_interaction(interaction_id);
        inner.interactions.push(interaction.clone());
        Ok(interaction)
    }

    async fn popular_products(
        &self,
        retailer_id: i64,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PopularProduct>> {
        let inner = self.inner.read().await;

        let mut counts: HashMap<i64, i64> = HashMap::new();
        for interaction in inner
            .interactions
            .iter()
            .filter(|i| i.retailer_id == retailer_id && i.action_type == ActionType::View)
        {
            *counts.entry(interaction.product_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .filter_map(|(product_id, view_count)| {
                inner.products.get(&product_id).map(|p| PopularProduct {
                    product_id,
                    name: p.name.clone(),
                    brand: p.brand.clone(),
                    category: p.category.clone(),
                    view_count,
                })
            })
            .collect())
    }

    async fn view_events(&self) -> AppResult<Vec<ViewEvent>> {
        let inner = self.inner.read().await;
        Ok(inner
            .interactions
            .iter()
            .filter(|i| i.action_type == ActionType::View)
            .map(|i| ViewEvent::new(i.retailer_id, i.product_id))
            .collect())
    }

    async fn products_by_ids(&self, product_ids: &[i64]) -> AppResult<Vec<Product>> {
        let inner = self.inner.read().await;
        Ok(product_ids
            .iter()
            .filter_map(|id| inner.products.get(id).cloned())
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Entry count past which a write first sweeps expired entries
const SWEEP_THRESHOLD: usize = 1024;

/// In-process cache backend; writes land immediately
///
/// Keys include caller-chosen paging, so expired entries are swept on write
/// once the map passes [`SWEEP_THRESHOLD`] rather than waiting for a read.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        tracing::debug!(
            swept = before.saturating_sub(self.entries.len()),
            remaining = self.entries.len(),
            "Swept expired cache entries"
        );
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.1 {
                return Ok(Some(entry.0.clone()));
            }
        }

        // Re-checked under the shard lock so a concurrent refresh survives
        self.entries
            .remove_if(key, |_, (_, expires_at)| Instant::now() >= *expires_at);
        Ok(None)
    }

    fn set_in_background(&self, key: String, value: String, ttl: u64) {
        if self.entries.len() >= SWEEP_THRESHOLD {
            self.sweep_expired();
        }
        let expires_at = Instant::now() + Duration::from_secs(ttl);
        self.entries.insert(key, (value, expires_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use tokio_test::assert_ok;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for name in ["Alpha Traders", "Bharat Stores"] {
            assert_ok!(
                store
                    .create_retailer(NewRetailer {
                        name: name.to_string(),
                        location: "Chennai".to_string(),
                        last_login: None,
                    })
                    .await
            );
        }
        for name in ["Soap", "Oil", "Flour"] {
            assert_ok!(
                store
                    .create_product(NewProduct {
                        name: name.to_string(),
                        category: "FMCG".to_string(),
                        brand: "Generic".to_string(),
                        price: 10.0,
                        product_metadata: json!({}),
                    })
                    .await
            );
        }
        store
    }

    async fn record(store: &MemoryStore, retailer_id: i64, product_id: i64, action: ActionType) {
        assert_ok!(
            store
                .create_interaction(NewInteraction {
                    retailer_id,
                    product_id,
                    action_type: action,
                    timestamp: Utc::now(),
                })
                .await
        );
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = seeded_store().await;
        let products = store.products_by_ids(&[1, 2, 3]).await.unwrap();
        let ids: Vec<i64> = products.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_interaction_requires_known_ids() {
        let store = seeded_store().await;
        let result = store
            .create_interaction(NewInteraction {
                retailer_id: 99,
                product_id: 1,
                action_type: ActionType::View,
                timestamp: Utc::now(),
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_popular_products_counts_views_only() {
        let store = seeded_store().await;
        record(&store, 1, 2, ActionType::View).await;
        record(&store, 1, 2, ActionType::View).await;
        record(&store, 1, 3, ActionType::View).await;
        record(&store, 1, 1, ActionType::Search).await;
        record(&store, 1, 1, ActionType::AddToCart).await;
        record(&store, 2, 1, ActionType::View).await;

        let popular = store.popular_products(1, 5, 0).await.unwrap();
        let ranked: Vec<(i64, i64)> = popular.iter().map(|p| (p.product_id, p.view_count)).collect();
        assert_eq!(ranked, vec![(2, 2), (3, 1)]);

        let page = store.popular_products(1, 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].product_id, 3);
    }

    #[tokio::test]
    async fn test_view_events_in_recording_order() {
        let store = seeded_store().await;
        record(&store, 2, 3, ActionType::View).await;
        record(&store, 1, 1, ActionType::Search).await;
        record(&store, 1, 2, ActionType::View).await;

        let events = store.view_events().await.unwrap();
        assert_eq!(events, vec![ViewEvent::new(2, 3), ViewEvent::new(1, 2)]);
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryCache::new();
        cache.set_in_background("fresh".to_string(), "1".to_string(), 60);
        cache.set_in_background("stale".to_string(), "2".to_string(), 0);

        assert_eq!(cache.get("fresh").await.unwrap(), Some("1".to_string()));
        assert_eq!(cache.get("stale").await.unwrap(), None);
        assert_eq!(cache.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache_sweeps_expired_on_write() {
        let cache = MemoryCache::new();
        for offset in 0..10_000 {
            cache.set_in_background(
                format!("recommendations:1:5:{}", offset),
                "[]".to_string(),
                0,
            );
        }
        cache.set_in_background("ml_recommendations:1".to_string(), "{}".to_string(), 60);

        assert!(cache.len() <= SWEEP_THRESHOLD, "retained {}", cache.len());
        assert_eq!(
            cache.get("ml_recommendations:1").await.unwrap(),
            Some("{}".to_string())
        );
    }

    #[tokio::test]
    async fn test_memory_cache_sweep_keeps_live_entries() {
        let cache = MemoryCache::new();
        for retailer_id in 0..SWEEP_THRESHOLD {
            cache.set_in_background(
                format!("ml_recommendations:{}", retailer_id),
                "{}".to_string(),
                60,
            );
        }
        cache.set_in_background("ml_recommendations:extra".to_string(), "{}".to_string(), 60);

        assert_eq!(cache.len(), SWEEP_THRESHOLD + 1);
    }

    #[tokio::test]
    async fn test_memory_cache_refresh_replaces_expired_entry() {
        let cache = MemoryCache::new();
        cache.set_in_background("recommendations:3:5:0".to_string(), "old".to_string(), 0);
        cache.set_in_background("recommendations:3:5:0".to_string(), "new".to_string(), 60);

        assert_eq!(
            cache.get("recommendations:3:5:0").await.unwrap(),
            Some("new".to_string())
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_cache_expired_read_removes_entry() {
        let cache = MemoryCache::new();
        cache.set_in_background("stale".to_string(), "1".to_string(), 0);
        assert_eq!(cache.get("stale").await.unwrap(), None);
        assert!(cache.is_empty());
    }
}
