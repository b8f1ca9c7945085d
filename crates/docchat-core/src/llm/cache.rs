//! Embedding cache to avoid re-embedding identical text

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_CAPACITY: usize = 10_000;

struct CacheEntry {
    embedding: Vec<f32>,
    expires_at: Instant,
}

/// In-memory TTL cache of embeddings keyed by (model, text)
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl EmbeddingCache {
    /// Create new cache with default TTL of 1 hour
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Get cached embedding if present and not expired
    pub fn get(&self, model: &str, text: &str) -> Option<Vec<f32>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&cache_key(model, text))?;
        (Instant::now() < entry.expires_at).then(|| entry.embedding.clone())
    }

    pub fn insert(&self, model: &str, text: &str, embedding: Vec<f32>) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        if entries.len() >= self.capacity {
            let now = Instant::now();
            entries.retain(|_, e| now < e.expires_at);
            if entries.len() >= self.capacity {
                // Still full of live entries: start over rather than track LRU order.
                entries.clear();
            }
        }

        entries.insert(
            cache_key(model, text),
            CacheEntry {
                embedding,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        match self.entries.read() {
            Ok(entries) => {
                let now = Instant::now();
                let total = entries.len();
                let expired = entries.values().filter(|e| now >= e.expires_at).count();
                CacheStats {
                    total_entries: total,
                    expired_entries: expired,
                    active_entries: total - expired,
                }
            }
            Err(_) => CacheStats::default(),
        }
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

fn cache_key(model: &str, text: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{}:{}:{:x}", model, text.len(), hasher.finish())
}
