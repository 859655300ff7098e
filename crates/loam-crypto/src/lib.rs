//! Content hashing for loam.
//!
//! Objects are identified by the SHA-1 digest of their framing, the
//! `"<kind> <len>\0"` header followed by the payload. The same digest (without
//! framing) checksums the staging index file.

pub mod hasher;

pub use hasher::{ContentHasher, DIGEST_LEN};
