use loam_types::{ObjectId, ObjectKind, OBJECT_ID_HEX_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::ContentObject;

/// Minimum number of hex characters accepted as a lookup prefix.
pub const MIN_PREFIX_LEN: usize = 2;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same (kind, payload) always
///   produces the same ID and, for on-disk stores, the same stored bytes.
/// - Reads verify what they return; corruption surfaces as an error and is
///   never repaired.
/// - The store never interprets payloads.
pub trait ObjectStore: Send + Sync {
    /// Hash and persist a payload; returns its content-addressed ID.
    ///
    /// Writing an object that already exists is a no-op.
    fn put(&self, kind: ObjectKind, payload: &[u8]) -> StoreResult<ObjectId>;

    /// Read and verify an object by its ID.
    fn get(&self, id: &ObjectId) -> StoreResult<ContentObject>;

    /// Resolve a hex prefix (2 to 40 characters) to the unique matching ID.
    fn resolve(&self, prefix: &str) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn contains(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Persist an already built object.
    fn put_object(&self, object: &ContentObject) -> StoreResult<ObjectId> {
        self.put(object.kind, &object.payload)
    }

    /// Resolve a prefix and read the object it names.
    fn get_by_prefix(&self, prefix: &str) -> StoreResult<(ObjectId, ContentObject)> {
        let id = self.resolve(prefix)?;
        Ok((id, self.get(&id)?))
    }
}

/// Validate a lookup prefix and return it lowercased.
pub fn normalize_prefix(prefix: &str) -> StoreResult<String> {
    let invalid = |reason: &str| StoreError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason: reason.to_string(),
    };
    if prefix.len() < MIN_PREFIX_LEN {
        return Err(invalid("hash prefix must be 2 or more characters"));
    }
    if prefix.len() > OBJECT_ID_HEX_LEN {
        return Err(invalid("hash prefix is longer than a full hash"));
    }
    if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("hash prefix must be hexadecimal"));
    }
    Ok(prefix.to_ascii_lowercase())
}
