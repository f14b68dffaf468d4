//! In-process response cache.
//!
//! Entries are JSON strings keyed by name, each with its own time to live.
//! Expired entries are dropped lazily on access.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::repos::crud::ResourceParams;

#[derive(Debug, Clone)]
struct CacheEntry {
    json: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cheap to clone; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct CacheService {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl CacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` as JSON for `ttl`. `None` values and a zero TTL are ignored.
    pub fn set_cache_response<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: Option<&T>,
        ttl: Duration,
    ) {
        let Some(value) = value else {
            return;
        };
        if ttl.is_zero() {
            return;
        }
        match serde_json::to_string(value) {
            Ok(json) => {
                self.entries.insert(
                    key.to_string(),
                    CacheEntry {
                        json,
                        expires_at: Instant::now() + ttl,
                    },
                );
                debug!(cache_key = key, ttl_secs = ttl.as_secs(), "cached response");
            }
            Err(e) => warn!(cache_key = key, error = %e, "response not cacheable"),
        }
    }

    pub fn get_cached_response(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Some(entry.json.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    /// Cached value decoded as `T`; undecodable entries count as misses.
    pub fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.get_cached_response(key)?;
        serde_json::from_str(&json)
            .map_err(|e| warn!(cache_key = key, error = %e, "cached value did not decode"))
            .ok()
    }

    pub fn remove_cached_response(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Keys of live entries, sorted.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.is_live(now));
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

/// Cache key for a paged listing of `entity`.
pub fn generate_cache_key(entity: &str, params: &ResourceParams) -> String {
    format!(
        "{entity}_PageNumber={}; PageSize={}; Asc={}; OrderBy={}; FilterQuery={};",
        params.page_number,
        params.page_size,
        if params.asc { "True" } else { "False" },
        params.order_by.as_deref().unwrap_or_default(),
        params.filter_query.as_deref().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        order_index: Option<i32>,
    }

    #[test]
    fn stores_camel_case_json() {
        let cache = CacheService::new();
        cache.set_cache_response("k", Some(&Row { order_index: Some(1) }), Duration::from_secs(60));
        assert_eq!(cache.get_cached_response("k").as_deref(), Some(r#"{"orderIndex":1}"#));
        assert_eq!(cache.get_cached::<Row>("k"), Some(Row { order_index: Some(1) }));
    }

    #[test]
    fn none_and_zero_ttl_are_ignored() {
        let cache = CacheService::new();
        cache.set_cache_response::<Row>("none", None, Duration::from_secs(60));
        cache.set_cache_response("zero", Some(&Row { order_index: None }), Duration::ZERO);
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn expired_entries_disappear() {
        let cache = CacheService::new();
        cache.set_cache_response("short", Some(&1), Duration::from_millis(1));
        cache.set_cache_response("long", Some(&2), Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get_cached_response("short"), None);
        assert_eq!(cache.keys(), vec!["long".to_string()]);
    }

    #[test]
    fn remove_and_clone_share_storage() {
        let cache = CacheService::new();
        let clone = cache.clone();
        cache.set_cache_response("k", Some(&"v"), Duration::from_secs(60));
        assert!(clone.get_cached_response("k").is_some());
        clone.remove_cached_response("k");
        assert!(cache.get_cached_response("k").is_none());
    }

    #[test]
    fn cache_key_format() {
        let params = ResourceParams {
            order_by: Some("Name".into()),
            asc: false,
            filter_query: Some("Price > 5".into()),
            page_size: 10,
            page_number: 3,
        };
        assert_eq!(
            generate_cache_key("Products", &params),
            "Products_PageNumber=3; PageSize=10; Asc=False; OrderBy=Name; FilterQuery=Price > 5;"
        );
        assert_eq!(
            generate_cache_key("Products", &ResourceParams::default()),
            "Products_PageNumber=1; PageSize=40; Asc=True; OrderBy=; FilterQuery=;"
        );
    }
}
