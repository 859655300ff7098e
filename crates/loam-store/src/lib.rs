//! Content-addressed object storage for loam.
//!
//! Objects live under `<root>/objects/<hash[0:2]>/<hash[2:]>`, analogous to
//! git's loose objects. Each file holds the compressed framing
//! `"<kind> <len>\0<payload>"`, so kind and size are recovered from the file
//! alone.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- sharded on-disk store
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes replace whole files; a partial write is caught on read by the
//!    decompression and length checks, never by the write path.
//! 3. Corrupt objects are reported, never repaired.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod compress;
pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::ContentObject;
pub use traits::ObjectStore;
