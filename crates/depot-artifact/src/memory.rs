use std::collections::BTreeMap;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{ByteStream, Error, Store, collect, from_bytes};

/// In-memory storage backend.
///
/// Objects live in a sorted map, so [`Store::list`] yields names in
/// lexicographic order. Suitable for exercising store logic in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  objects: Mutex<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether an object with the given name exists.
  pub async fn contains(&self, name: &str) -> bool {
    self.objects.lock().await.contains_key(name)
  }
}

impl Store for MemoryStore {
  async fn create_new(&self, name: &str) -> Result<(), Error> {
    let mut objects = self.objects.lock().await;
    if objects.contains_key(name) {
      return Err(Error::AlreadyExists(name.to_string()));
    }
    objects.insert(name.to_string(), Bytes::new());
    Ok(())
  }

  async fn put(&self, name: &str, data: ByteStream) -> Result<(), Error> {
    let bytes = collect(data).await?;
    self.objects.lock().await.insert(name.to_string(), bytes);
    Ok(())
  }

  async fn get(&self, name: &str) -> Result<ByteStream, Error> {
    let objects = self.objects.lock().await;
    match objects.get(name) {
      Some(bytes) => Ok(from_bytes(bytes.clone())),
      None => Err(Error::NotFound(name.to_string())),
    }
  }

  async fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
    let mut objects = self.objects.lock().await;
    match objects.remove(from) {
      Some(bytes) => {
        objects.insert(to.to_string(), bytes);
        Ok(())
      }
      None => Err(Error::NotFound(from.to_string())),
    }
  }

  async fn delete(&self, name: &str) -> Result<(), Error> {
    match self.objects.lock().await.remove(name) {
      Some(_) => Ok(()),
      None => Err(Error::NotFound(name.to_string())),
    }
  }

  async fn list(&self) -> Result<Vec<String>, Error> {
    Ok(self.objects.lock().await.keys().cloned().collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_memory_store() {
    let store = MemoryStore::new();

    assert!(store.list().await.unwrap().is_empty());

    store.create_new("b.json").await.unwrap();
    assert!(matches!(
      store.create_new("b.json").await,
      Err(Error::AlreadyExists(_))
    ));

    store
      .put("a.dat", from_bytes(Bytes::from_static(b"payload")))
      .await
      .unwrap();
    let bytes = collect(store.get("a.dat").await.unwrap()).await.unwrap();
    assert_eq!(&bytes[..], b"payload");

    // Names come back sorted.
    assert_eq!(
      store.list().await.unwrap(),
      vec!["a.dat".to_string(), "b.json".to_string()]
    );

    store.rename("b.json", "c.json").await.unwrap();
    assert!(!store.contains("b.json").await);
    assert!(store.contains("c.json").await);

    store.delete("a.dat").await.unwrap();
    assert!(matches!(store.get("a.dat").await, Err(Error::NotFound(_))));
  }
}
