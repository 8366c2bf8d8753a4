/// Read-through cache around a store query
///
/// Expands to: look `$key` up in the [`Cache`](crate::db::Cache), and on a
/// miss await `$block`, queue its value for a write with `$ttl` seconds of
/// expiry, and return it. Errors from either step propagate with `?`, so the
/// enclosing function must return `AppResult`.
///
/// `services::recommendations::popular_products` wraps its per-page query
/// this way under `CacheKey::Popular`. `similar_products` does its own lookup
/// instead, because it must not store the empty response.
///
/// ```rust,ignore
/// let key = CacheKey::Popular { retailer_id, limit, offset };
/// cached!(cache, key, ttl, async {
///     let recommendations = store.popular_products(retailer_id, limit, offset).await?;
///     Ok::<_, AppError>(RecommendationResponse { retailer_id, recommendations })
/// })
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(hit) = $cache.get_from_cache(&$key).await? {
            Ok(hit)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
