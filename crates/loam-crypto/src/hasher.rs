use loam_types::{ObjectId, ObjectKind, OBJECT_ID_LEN};
use sha1::{Digest, Sha1};

/// Length of a raw digest in bytes.
pub const DIGEST_LEN: usize = OBJECT_ID_LEN;

/// Framed SHA-1 content hasher.
///
/// The kind and byte length are part of the hashed input, so identical bytes
/// declared as different kinds (or with a different length) never share an
/// id, and a reader can recover both from the stored object alone.
pub struct ContentHasher;

impl ContentHasher {
    /// Build the framing buffer `"<kind> <len>\0<payload>"`.
    pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
        let header = format!("{} {}", kind, payload.len());
        let mut framed = Vec::with_capacity(header.len() + 1 + payload.len());
        framed.extend_from_slice(header.as_bytes());
        framed.push(0);
        framed.extend_from_slice(payload);
        framed
    }

    /// Object id of a payload of the given kind.
    pub fn hash(kind: ObjectKind, payload: &[u8]) -> ObjectId {
        let header = format!("{} {}", kind, payload.len());
        let mut hasher = Sha1::new();
        hasher.update(header.as_bytes());
        hasher.update([0u8]);
        hasher.update(payload);
        ObjectId::from_digest(hasher.finalize().into())
    }

    /// Object id of an already framed buffer.
    pub fn hash_framed(framed: &[u8]) -> ObjectId {
        ObjectId::from_digest(Self::raw_hash(framed))
    }

    /// Verify that a payload produces the expected object ID.
    pub fn verify(kind: ObjectKind, payload: &[u8], expected: &ObjectId) -> bool {
        Self::hash(kind, payload) == *expected
    }

    /// Raw SHA-1 digest without framing (for file checksums).
    pub fn raw_hash(data: &[u8]) -> [u8; DIGEST_LEN] {
        Sha1::digest(data).into()
    }
}
