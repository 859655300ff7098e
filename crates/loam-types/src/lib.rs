//! Foundation types for loam.
//!
//! Every other loam crate depends on `loam-types`. It holds the identifiers
//! and kinds shared by the object store and the staging index, plus the
//! repository layout and configuration that get threaded into their
//! constructors.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Content-addressed identifier (160-bit SHA-1 digest)
//! - [`ObjectKind`] — Object type tag (`blob`, `tree`, `commit`)
//! - [`RepoLayout`] — Paths of the objects directory, index and config
//! - [`RepoConfig`] — TOML-backed repository configuration

pub mod config;
pub mod error;
pub mod layout;
pub mod object;

pub use config::{Compression, RepoConfig, StoreConfig};
pub use error::TypeError;
pub use layout::{RepoLayout, REPO_DIR};
pub use object::{ObjectId, ObjectKind, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
