use std::collections::HashMap;
use std::sync::RwLock;

use loam_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::ContentObject;
use crate::traits::{normalize_prefix, ObjectStore};

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Follows the same prefix rules as the
/// on-disk store. Objects are cloned on read and write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, ContentObject>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total payload bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.size() as u64)
            .sum()
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn put(&self, kind: ObjectKind, payload: &[u8]) -> StoreResult<ObjectId> {
        let object = ContentObject::new(kind, payload);
        let id = object.compute_id();
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert(object);
        Ok(id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<ContentObject> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_hex()))
    }

    fn resolve(&self, prefix: &str) -> StoreResult<ObjectId> {
        let prefix = normalize_prefix(prefix)?;
        let map = self.objects.read().expect("lock poisoned");
        let mut matches = map.keys().filter(|id| id.to_hex().starts_with(&prefix));
        let first = matches
            .next()
            .copied()
            .ok_or_else(|| StoreError::NotFound(prefix.clone()))?;
        let others = matches.count();
        if others > 0 {
            return Err(StoreError::AmbiguousPrefix {
                prefix,
                matches: others + 1,
            });
        }
        Ok(first)
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}
