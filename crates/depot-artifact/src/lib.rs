//! Depot Artifact
//!
//! This crate provides the storage backend trait and implementations for
//! depot. The store above it deals in named objects (metadata records and
//! binary payloads); this crate owns how those objects reach durable storage.
//!
//! The [`Store`] trait defines the capability set the release store needs:
//! exclusive creation (the uniqueness primitive for identifier allocation),
//! whole-object reads and writes, rename, delete, and name listing.
//! [`FsStore`] persists objects as files under a base directory;
//! [`MemoryStore`] is an in-memory implementation for exercising store logic
//! without touching a real filesystem.
//!
//! Object content moves as async byte streams for efficient handling of
//! large payloads.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, stream};

/// A stream of object content.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, Error>> + Send>>;

/// Errors that can occur in a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Exclusive creation refused because the object already exists.
  #[error("object already exists: {0}")]
  AlreadyExists(String),

  /// Object not found.
  #[error("object not found: {0}")]
  NotFound(String),

  /// Underlying I/O failure.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Storage backend trait.
///
/// Implementations provide durable (or test-scoped) storage for named
/// objects. Names are flat tokens chosen by the caller; implementations do
/// not interpret them beyond locating the object.
pub trait Store {
  /// Create an empty object, failing with [`Error::AlreadyExists`] if the
  /// name is taken.
  ///
  /// This is the only uniqueness primitive the backend offers: the check and
  /// the creation are one operation, with no race window between them.
  fn create_new(&self, name: &str) -> impl std::future::Future<Output = Result<(), Error>> + Send;

  /// Write an object from a byte stream, creating or truncating it.
  fn put(
    &self,
    name: &str,
    data: ByteStream,
  ) -> impl std::future::Future<Output = Result<(), Error>> + Send;

  /// Read an object's content as a byte stream.
  fn get(&self, name: &str) -> impl std::future::Future<Output = Result<ByteStream, Error>> + Send;

  /// Rename an object, replacing any object already at the target name.
  fn rename(
    &self,
    from: &str,
    to: &str,
  ) -> impl std::future::Future<Output = Result<(), Error>> + Send;

  /// Delete an object by name.
  fn delete(&self, name: &str) -> impl std::future::Future<Output = Result<(), Error>> + Send;

  /// List the names of all stored objects, in backend enumeration order.
  fn list(&self) -> impl std::future::Future<Output = Result<Vec<String>, Error>> + Send;
}

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn from_bytes(bytes: Bytes) -> ByteStream {
  Box::pin(stream::iter([Ok::<_, Error>(bytes)]))
}

/// Drain a [`ByteStream`] into a single contiguous buffer.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes, Error> {
  let mut buf = BytesMut::new();
  while let Some(chunk) = stream.next().await {
    buf.extend_from_slice(&chunk?);
  }
  Ok(buf.freeze())
}
