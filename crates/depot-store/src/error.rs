use thiserror::Error;

/// Errors that can occur when publishing or listing releases.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Backend storage failed (directory unreadable, reservation or read
  /// failure).
  #[error("storage error: {0}")]
  Storage(#[from] depot_artifact::Error),

  /// No free identifier after the bounded number of suffix attempts.
  #[error("no free release identifier for '{token}' after {attempts} attempts")]
  IdsExhausted { token: String, attempts: u32 },

  /// Payload could not be created or written.
  #[error("failed to write payload for release '{id}': {source}")]
  PayloadWrite {
    id: String,
    #[source]
    source: depot_artifact::Error,
  },

  /// Finalized record could not be serialized.
  #[error("failed to encode metadata for release '{id}': {source}")]
  MetadataEncode {
    id: String,
    #[source]
    source: serde_json::Error,
  },

  /// A stored metadata record could not be parsed during listing.
  #[error("unable to decode file: {file}")]
  MetadataDecode {
    file: String,
    #[source]
    source: serde_json::Error,
  },
}
