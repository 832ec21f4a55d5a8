//! Short-lived read cache for hot GET endpoints.
//!
//! Entries are advisory copies of query results. Write paths never read from
//! here; they only invalidate the keys they affect.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

pub const COSMETICS_KEY: &str = "cosmetics:all";

pub fn difficulty_key(game_id: i64) -> String {
    format!("difficulty:{}", game_id)
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct TtlCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: Value) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Background task that purges expired entries on an interval.
pub async fn run_sweeper(cache: TtlCache, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        let purged = cache.purge_expired().await;
        if purged > 0 {
            debug!("Cache sweep: purged {} expired entries", purged);
        }
    }
}
