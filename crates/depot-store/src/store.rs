use bytes::Bytes;
use chrono::{Local, Utc};
use depot_artifact::{ByteStream, Store, from_bytes};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::release::{Release, ReleaseRequest};

/// File extension of metadata records.
const METADATA_EXT: &str = ".json";

/// File extension of payload artifacts.
const PAYLOAD_EXT: &str = ".dat";

/// Suffix attempts per timestamp token before identifier allocation gives up.
const MAX_ID_ATTEMPTS: u32 = 1000;

/// Release store over a storage backend.
///
/// Each published release occupies two objects in the backend: `<id>.json`
/// (the metadata record) and `<id>.dat` (the raw payload). Identifiers are
/// derived from the wall clock and disambiguated with `_1`, `_2`, …
/// suffixes when publishes collide within the same second.
///
/// The store performs no cross-object locking; concurrent publishes are kept
/// apart solely by the backend's exclusive-create operation, and a listing
/// that races a publish may observe a record before its metadata is written
/// and fail to decode it.
pub struct ReleaseStore<S> {
  backend: S,
}

impl<S: Store> ReleaseStore<S> {
  /// Create a release store over the given backend.
  pub fn new(backend: S) -> Self {
    Self { backend }
  }

  /// Get the underlying storage backend.
  pub fn backend(&self) -> &S {
    &self.backend
  }

  /// Current wall-clock time as a fixed-width, filesystem-safe token,
  /// e.g. "20240101T000000+0000".
  fn timestamp_token() -> String {
    Local::now().format("%Y%m%dT%H%M%S%z").to_string()
  }

  /// Reserve a fresh identifier by exclusively creating its metadata name.
  ///
  /// The returned identifier corresponds to a metadata object that did not
  /// exist prior to this call. Only "already exists" triggers a retry with
  /// the next numeric suffix; any other backend error aborts. The retry is
  /// bounded, so pathological publish rates surface
  /// [`StoreError::IdsExhausted`] instead of looping forever.
  async fn reserve_id(&self, token: &str) -> Result<String, StoreError> {
    for attempt in 0..MAX_ID_ATTEMPTS {
      let candidate = if attempt == 0 {
        token.to_string()
      } else {
        format!("{token}_{attempt}")
      };

      match self.backend.create_new(&format!("{candidate}{METADATA_EXT}")).await {
        Ok(()) => return Ok(candidate),
        Err(depot_artifact::Error::AlreadyExists(_)) => continue,
        Err(e) => return Err(e.into()),
      }
    }

    Err(StoreError::IdsExhausted {
      token: token.to_string(),
      attempts: MAX_ID_ATTEMPTS,
    })
  }

  /// Publish a new release.
  ///
  /// Assigns a fresh identifier and the current timestamp, writes the
  /// payload in full, then finalizes the metadata record. The payload is
  /// durable before the record becomes visible: the record is serialized to
  /// a temporary name and renamed over its reservation only after the
  /// payload write completed.
  ///
  /// On failure nothing is considered published: a failed payload write
  /// removes the identifier reservation (best-effort, unchecked), and a
  /// failed finalize additionally removes the payload and the temporary
  /// record.
  pub async fn publish(
    &self,
    request: ReleaseRequest,
    payload: ByteStream,
  ) -> Result<Release, StoreError> {
    let id = self.reserve_id(&Self::timestamp_token()).await?;

    let release = Release {
      id: id.clone(),
      version: request.version,
      description: request.description,
      date: Utc::now(),
    };

    let payload_name = format!("{id}{PAYLOAD_EXT}");
    if let Err(e) = self.backend.put(&payload_name, payload).await {
      let _ = self.backend.delete(&format!("{id}{METADATA_EXT}")).await;
      return Err(StoreError::PayloadWrite { id, source: e });
    }

    if let Err(e) = self.finalize(&release).await {
      let _ = self.backend.delete(&format!("{id}{METADATA_EXT}.tmp")).await;
      let _ = self.backend.delete(&payload_name).await;
      let _ = self.backend.delete(&format!("{id}{METADATA_EXT}")).await;
      return Err(e);
    }

    info!(id = %release.id, version = %release.version, "published release");
    Ok(release)
  }

  /// Serialize the finalized record and rename it over its reservation.
  async fn finalize(&self, release: &Release) -> Result<(), StoreError> {
    let encoded = serde_json::to_vec(release).map_err(|e| StoreError::MetadataEncode {
      id: release.id.clone(),
      source: e,
    })?;

    let temp_name = format!("{}{METADATA_EXT}.tmp", release.id);
    let final_name = format!("{}{METADATA_EXT}", release.id);

    self.backend.put(&temp_name, from_bytes(Bytes::from(encoded))).await?;
    self.backend.rename(&temp_name, &final_name).await?;
    Ok(())
  }

  /// List all stored release records, in backend enumeration order.
  ///
  /// An empty storage directory yields an empty vector. A record that fails
  /// to decode aborts the whole call with an error naming the offending
  /// file; there is no skip-and-continue mode.
  pub async fn list(&self) -> Result<Vec<Release>, StoreError> {
    let names = self.backend.list().await?;
    let mut releases = Vec::new();

    for name in names {
      if !name.ends_with(METADATA_EXT) {
        continue;
      }

      let bytes = depot_artifact::collect(self.backend.get(&name).await?).await?;
      let release: Release =
        serde_json::from_slice(&bytes).map_err(|e| StoreError::MetadataDecode {
          file: name.clone(),
          source: e,
        })?;
      releases.push(release);
    }

    debug!(count = releases.len(), "listed releases");
    Ok(releases)
  }

  /// Remove a published release by identifier.
  ///
  /// Deletion semantics are intentionally undefined: the call accepts any
  /// identifier, performs no storage change, and always succeeds.
  pub async fn unpublish(&self, id: &str) -> Result<(), StoreError> {
    debug!(id = %id, "unpublish requested (no-op)");
    Ok(())
  }
}
