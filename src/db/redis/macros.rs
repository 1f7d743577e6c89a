/// Read-through caching around a future resolving to `AppResult<T>`.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$fetch`,
/// queues its value for storage with `$ttl` seconds to live, and returns it. A failed
/// cache read is logged and treated as a miss. Errors from `$fetch` propagate with `?`,
/// so this must be used inside a function returning `AppResult`.
///
/// ```rust,ignore
/// let movies: Vec<MovieSummary> =
///     cached!(self.cache, CacheKey::MovieSearch(title.to_string()), SEARCH_CACHE_TTL, self.fetch_search(title))?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $fetch:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed; fetching upstream");
                None
            }
        };

        match hit {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                let value = $fetch.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
