use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::Attribute;

/// In-memory cache for attribute metadata lookups, keyed by
/// (entity type, attribute code).
///
/// Misses are cached too (as `None`), mirroring how the EAV config layer
/// behaves: after a schema-level add the stale absent entry survives until
/// `clear` is called, which is why the seeder must clear between creating an
/// attribute and re-fetching it.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: Arc<RwLock<HashMap<(String, String), Option<Attribute>>>>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a cached lookup result if present. The outer `Option` is cache
    /// presence, the inner one the cached lookup outcome.
    pub async fn get(&self, entity_type: &str, code: &str) -> Option<Option<Attribute>> {
        let entries = self.entries.read().await;
        entries
            .get(&(entity_type.to_string(), code.to_string()))
            .cloned()
    }

    /// Cache a lookup result, hit or miss.
    pub async fn put(&self, entity_type: &str, code: &str, attribute: Option<Attribute>) {
        let mut entries = self.entries.write().await;
        entries.insert((entity_type.to_string(), code.to_string()), attribute);
    }

    /// Drop one entry, e.g. after saving the attribute it covers.
    pub async fn remove(&self, entity_type: &str, code: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(&(entity_type.to_string(), code.to_string()));
    }

    /// Drop everything.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}
