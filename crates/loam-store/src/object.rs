use loam_crypto::ContentHasher;
use loam_types::{ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};

/// A typed content object: kind tag plus payload bytes.
///
/// `ContentObject` is the unit of storage. Its identity is the hash of its
/// framing, so it is never mutated after being hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The raw payload bytes.
    pub payload: Vec<u8>,
}

impl ContentObject {
    /// Create a new object from kind and payload.
    pub fn new(kind: ObjectKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Shorthand for a blob.
    pub fn blob(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(ObjectKind::Blob, payload)
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        ContentHasher::hash(self.kind, &self.payload)
    }

    /// The framing buffer `"<kind> <len>\0<payload>"`.
    pub fn to_framed(&self) -> Vec<u8> {
        ContentHasher::frame(self.kind, &self.payload)
    }

    /// Parse a framing buffer.
    ///
    /// `object` names the object in error messages (a hex id or a path).
    pub fn from_framed(object: &str, framed: &[u8]) -> StoreResult<Self> {
        let corrupt = |reason: String| StoreError::CorruptObject {
            object: object.to_string(),
            reason,
        };

        let nul = framed
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("missing NUL after header".into()))?;
        let header = std::str::from_utf8(&framed[..nul])
            .map_err(|_| corrupt("header is not valid UTF-8".into()))?;

        let fields: Vec<&str> = header.split(' ').collect();
        if fields.len() != 2 {
            return Err(corrupt(format!(
                "header should have 2 fields but got {}",
                fields.len()
            )));
        }
        let kind: ObjectKind = fields[0].parse().map_err(|e| corrupt(format!("{e}")))?;
        let declared: usize = fields[1]
            .parse()
            .map_err(|_| corrupt(format!("size should be a number, got `{}`", fields[1])))?;

        let payload = &framed[nul + 1..];
        if payload.len() != declared {
            return Err(corrupt(format!(
                "expected size {declared}, got {} bytes",
                payload.len()
            )));
        }
        Ok(Self::new(kind, payload))
    }
}
