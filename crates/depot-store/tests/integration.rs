//! Integration tests for depot-store against the real filesystem backend.

use bytes::Bytes;
use chrono::DateTime;
use depot_artifact::{FsStore, from_bytes};
use depot_store::{ReleaseRequest, ReleaseStore};

fn fs_store() -> (ReleaseStore<FsStore>, tempfile::TempDir) {
  let dir = tempfile::tempdir().expect("failed to create temp dir");
  (ReleaseStore::new(FsStore::new(dir.path())), dir)
}

fn request(version: &str, description: &str) -> ReleaseRequest {
  ReleaseRequest {
    version: version.to_string(),
    description: description.to_string(),
  }
}

#[tokio::test]
async fn publish_then_list_roundtrip() {
  let (store, dir) = fs_store();

  let release = store
    .publish(
      request("1.0.0", "first release"),
      from_bytes(Bytes::from_static(&[0x01, 0x02, 0x03])),
    )
    .await
    .unwrap();

  assert!(!release.id.is_empty());
  assert_eq!(release.version, "1.0.0");
  assert_eq!(release.description, "first release");

  let listed = store.list().await.unwrap();
  assert_eq!(listed, vec![release.clone()]);

  // The payload artifact holds the exact input bytes.
  let payload = std::fs::read(dir.path().join(format!("{}.dat", release.id))).unwrap();
  assert_eq!(payload, vec![0x01, 0x02, 0x03]);

  // Exactly the metadata record and the payload remain on disk.
  let mut names: Vec<_> = std::fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().into_string().unwrap())
    .collect();
  names.sort();
  assert_eq!(
    names,
    vec![format!("{}.dat", release.id), format!("{}.json", release.id)]
  );
}

#[tokio::test]
async fn list_on_empty_directory_is_empty() {
  let (store, _dir) = fs_store();
  assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_idempotent() {
  let (store, _dir) = fs_store();

  store
    .publish(request("1.0.0", "a"), from_bytes(Bytes::new()))
    .await
    .unwrap();
  store
    .publish(request("1.1.0", "b"), from_bytes(Bytes::new()))
    .await
    .unwrap();

  let first = store.list().await.unwrap();
  let second = store.list().await.unwrap();
  assert_eq!(first.len(), 2);
  assert_eq!(first, second);
}

#[tokio::test]
async fn empty_payload_is_stored_verbatim() {
  let (store, dir) = fs_store();

  let release = store
    .publish(request("0.0.1", "nothing in here"), from_bytes(Bytes::new()))
    .await
    .unwrap();

  let payload = std::fs::read(dir.path().join(format!("{}.dat", release.id))).unwrap();
  assert!(payload.is_empty());
}

#[tokio::test]
async fn large_payload_is_stored_verbatim() {
  let (store, dir) = fs_store();

  let body: Vec<u8> = (0..256 * 1024).map(|n| (n % 251) as u8).collect();
  let release = store
    .publish(request("3.1.4", "big one"), from_bytes(Bytes::from(body.clone())))
    .await
    .unwrap();

  let payload = std::fs::read(dir.path().join(format!("{}.dat", release.id))).unwrap();
  assert_eq!(payload, body);
}

#[tokio::test]
async fn record_uses_interchange_field_names() {
  let (store, dir) = fs_store();

  let release = store
    .publish(request("2.0.0", "wire format"), from_bytes(Bytes::new()))
    .await
    .unwrap();

  let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", release.id))).unwrap();
  let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
  let object = value.as_object().unwrap();

  assert_eq!(object.get("ID").unwrap(), release.id.as_str());
  assert_eq!(object.get("Version").unwrap(), "2.0.0");
  assert_eq!(object.get("Description").unwrap(), "wire format");

  let date = object.get("Date").unwrap().as_str().unwrap();
  DateTime::parse_from_rfc3339(date).unwrap();
}

#[tokio::test]
async fn unpublish_leaves_listing_unchanged() {
  let (store, _dir) = fs_store();

  let release = store
    .publish(request("1.0.0", "still here"), from_bytes(Bytes::new()))
    .await
    .unwrap();

  let before = store.list().await.unwrap();
  store.unpublish(&release.id).await.unwrap();
  let after = store.list().await.unwrap();

  assert_eq!(before, after);
}
