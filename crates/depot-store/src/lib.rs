//! Depot Store
//!
//! This crate provides the release store: a minimal local store for release
//! artifacts. Each release is a small JSON metadata record (version,
//! description, publish date, generated identifier) paired with an opaque
//! binary payload, both persisted under one identifier.
//!
//! The [`ReleaseStore`] is generic over the storage backend
//! ([`depot_artifact::Store`]), so the publish/list logic runs unchanged
//! against the real filesystem or an in-memory store:
//! - Publishing reserves a fresh identifier through the backend's exclusive
//!   create, writes the payload in full, then finalizes the metadata record
//!   with a rename into place.
//! - Listing scans the backend for metadata records and decodes each one.

mod error;
mod release;
mod store;

pub use error::StoreError;
pub use release::{Release, ReleaseRequest};
pub use store::ReleaseStore;
