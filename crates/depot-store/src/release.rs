use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published release record.
///
/// Serialized field names follow the on-disk interchange format (`ID`,
/// `Version`, `Description`, `Date` with an RFC 3339 timestamp), so records
/// written by earlier deployments decode unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
  /// Generated identifier, unique within the storage directory.
  #[serde(rename = "ID")]
  pub id: String,

  /// Caller-supplied version string, e.g. "1.0.0".
  #[serde(rename = "Version")]
  pub version: String,

  /// Caller-supplied free-text description.
  #[serde(rename = "Description")]
  pub description: String,

  /// Moment of successful publish, assigned by the store.
  #[serde(rename = "Date")]
  pub date: DateTime<Utc>,
}

/// Caller-supplied fields of a publish request.
///
/// The identifier and publish date are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
  pub version: String,
  pub description: String,
}
