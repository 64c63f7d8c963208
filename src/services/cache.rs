// src/services/cache.rs
// DOCUMENTATION: In-memory cache for Nearby Search response pages
// PURPOSE: Avoid re-spending API quota on queries the process already ran

use crate::services::grid_planner::SearchCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// TTL cache of serialized search pages
/// DOCUMENTATION: Thread-safe; shared between searches via Arc
pub struct SearchCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Duration,
}

impl SearchCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Cache key for one page of one cell's search
    /// Cell centers are rounded to ~10 m so float noise cannot split entries.
    pub fn request_key(
        cell: &SearchCell,
        place_type: Option<&str>,
        keyword: Option<&str>,
        page_token: Option<&str>,
    ) -> String {
        format!(
            "nearby:{}:{}:{}:{}:{}:{}",
            (cell.center.latitude * 10_000.0).round() as i64,
            (cell.center.longitude * 10_000.0).round() as i64,
            cell.radius_meters.round() as i64,
            place_type.unwrap_or("all"),
            keyword.unwrap_or(""),
            page_token.unwrap_or("")
        )
    }

    /// Get cached page
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;

        if let Some(entry) = store.get(key) {
            if !entry.is_expired() {
                log::debug!("Cache HIT for key: {}", key);
                return Some(entry.data.clone());
            }
            log::debug!("Cache EXPIRED for key: {}", key);
        } else {
            log::debug!("Cache MISS for key: {}", key);
        }

        None
    }

    /// Store a page with the default TTL
    pub async fn set(&self, key: String, value: String) {
        let mut store = self.store.write().await;
        store.insert(key.clone(), CacheEntry::new(value, self.default_ttl));
        log::debug!(
            "Cache SET for key: {} (TTL: {}s)",
            key,
            self.default_ttl.as_secs()
        );
    }

    /// Drop expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after = store.len();

        if before > after {
            log::info!(
                "Cache cleanup: removed {} expired entries ({} remaining)",
                before - after,
                after
            );
        }
    }

    /// Snapshot of cache occupancy
    pub async fn metrics(&self) -> CacheMetrics {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheMetrics {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }

}

/// Cache occupancy counters
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheMetrics {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<SearchCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geo::Coordinate;

    fn cell() -> SearchCell {
        SearchCell {
            center: Coordinate::new(45.4215, -75.6972),
            radius_meters: 1000.0,
        }
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = SearchCache::new(60);
        let key = SearchCache::request_key(&cell(), Some("cafe"), None, None);

        cache.set(key.clone(), "page".to_string()).await;

        assert_eq!(cache.get(&key).await, Some("page".to_string()));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = SearchCache::new(1);
        let key = "short-lived".to_string();

        cache.set(key.clone(), "value".to_string()).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_cleanup() {
        let cache = SearchCache::new(1);

        cache.set("key1".to_string(), "value1".to_string()).await;
        cache.set("key2".to_string(), "value2".to_string()).await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        cache.cleanup().await;

        let metrics = cache.metrics().await;
        assert_eq!(metrics.active_entries, 0);
        assert_eq!(metrics.total_entries, 0);
    }

    #[test]
    fn test_request_key_stability() {
        let a = SearchCache::request_key(&cell(), Some("restaurant"), None, None);
        let b = SearchCache::request_key(&cell(), Some("restaurant"), None, None);
        assert_eq!(a, b);

        let nearby = SearchCell {
            center: Coordinate::new(45.4216, -75.6972),
            radius_meters: 1000.0,
        };
        let c = SearchCache::request_key(&nearby, Some("restaurant"), None, None);
        assert_ne!(a, c);
    }
}
