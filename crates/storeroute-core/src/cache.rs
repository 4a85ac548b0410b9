//! Route cache: one JSON table under a single storage key, mapping route
//! string to the raw GraphQL response envelope.
//!
//! Writes re-read the whole table and merge before persisting, so entries
//! written by other resolutions are kept. Nothing is evicted; there is no
//! locking across the read and the write (last writer wins).

use serde_json::{Map, Value};

use crate::error::StorageError;
use crate::graphql;
use crate::route::ResolvedRoute;
use crate::storage::KeyValueStore;

/// Storage key holding the serialized table.
pub const STORAGE_KEY: &str = "urlResolve";

pub type CacheTable = Map<String, Value>;

pub struct RouteCache<S> {
    store: S,
}

impl<S: KeyValueStore> RouteCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current table. A missing, unreadable or unparsable blob is an empty table.
    pub fn read_table(&self) -> CacheTable {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheTable::new(),
            Err(e) => {
                tracing::warn!("route cache unreadable, treating as empty: {}", e);
                return CacheTable::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(table)) => table,
            Ok(_) | Err(_) => {
                tracing::warn!("route cache is not a JSON object, treating as empty");
                CacheTable::new()
            }
        }
    }

    /// Raw envelope stored for `route`.
    pub fn entry(&self, route: &str) -> Option<Value> {
        self.read_table().remove(route)
    }

    /// Cached route for `route`. An entry whose envelope no longer yields a
    /// route counts as a miss.
    pub fn lookup(&self, route: &str) -> Option<ResolvedRoute> {
        let envelope = self.entry(route)?;
        match graphql::route_from_envelope(&envelope) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                tracing::warn!("ignoring unusable cache entry for {:?}: {}", route, e);
                None
            }
        }
    }

    /// Stores `envelope` under `route`, keeping every other entry.
    pub fn insert(&self, route: &str, envelope: &Value) -> Result<(), StorageError> {
        let mut table = self.read_table();
        table.insert(route.to_string(), envelope.clone());
        self.write_table(&table)
    }

    /// Cached route strings in table order.
    pub fn routes(&self) -> Vec<String> {
        self.read_table().keys().cloned().collect()
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(STORAGE_KEY)
    }

    fn write_table(&self, table: &CacheTable) -> Result<(), StorageError> {
        // A Map<String, Value> always serializes.
        let raw = Value::Object(table.clone()).to_string();
        self.store.set(STORAGE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteType;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn envelope(t: &str, id: i64) -> Value {
        json!({"data": {"urlResolver": {"type": t, "id": id}}})
    }

    #[test]
    fn empty_store_is_empty_table() {
        let cache = RouteCache::new(MemoryStore::new());
        assert!(cache.read_table().is_empty());
        assert_eq!(cache.lookup("/x.html"), None);
    }

    #[test]
    fn garbage_blob_is_empty_table() {
        let store = MemoryStore::new();
        store.set(STORAGE_KEY, "{{{ nope").unwrap();
        let cache = RouteCache::new(store);
        assert!(cache.read_table().is_empty());

        cache.store().set(STORAGE_KEY, "[1,2]").unwrap();
        assert!(cache.read_table().is_empty());
    }

    #[test]
    fn insert_merges_with_existing_entries() {
        let cache = RouteCache::new(MemoryStore::new());
        cache.insert("/a.html", &envelope("PRODUCT", 1)).unwrap();
        cache.insert("/b.html", &envelope("CATEGORY", 2)).unwrap();

        assert_eq!(
            cache.lookup("/a.html"),
            Some(ResolvedRoute::new(RouteType::Product, 1))
        );
        assert_eq!(
            cache.lookup("/b.html"),
            Some(ResolvedRoute::new(RouteType::Category, 2))
        );
        let mut routes = cache.routes();
        routes.sort();
        assert_eq!(routes, vec!["/a.html", "/b.html"]);
    }

    #[test]
    fn insert_rereads_table_written_elsewhere() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let first = RouteCache::new(store.clone());
        let second = RouteCache::new(store.clone());

        first.insert("/a.html", &envelope("PRODUCT", 1)).unwrap();
        second.insert("/b.html", &envelope("CMS_PAGE", 3)).unwrap();

        assert_eq!(first.routes().len(), 2);
        assert_eq!(first.entry("/a.html"), Some(envelope("PRODUCT", 1)));
    }

    #[test]
    fn entry_keeps_raw_envelope() {
        let cache = RouteCache::new(MemoryStore::new());
        let env = json!({"data": {"urlResolver": {"type": "PRODUCT", "id": 5}}, "extensions": {"cost": 1}});
        cache.insert("/shoes.html", &env).unwrap();
        assert_eq!(cache.entry("/shoes.html"), Some(env));
    }

    #[test]
    fn unusable_entry_is_a_miss() {
        let cache = RouteCache::new(MemoryStore::new());
        cache.insert("/broken", &json!({"oops": true})).unwrap();
        assert!(cache.entry("/broken").is_some());
        assert_eq!(cache.lookup("/broken"), None);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = RouteCache::new(MemoryStore::new());
        cache.insert("/a.html", &envelope("PRODUCT", 1)).unwrap();
        cache.clear().unwrap();
        assert!(cache.routes().is_empty());
    }
}
