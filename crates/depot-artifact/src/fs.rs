use std::path::PathBuf;

use futures::StreamExt;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::{ByteStream, Error, Store};

/// Filesystem-based storage backend.
///
/// Stores each object as a file at `{base_path}/{name}`. Parent directories
/// are created automatically on write.
pub struct FsStore {
  base_path: PathBuf,
}

impl FsStore {
  /// Create a new filesystem store with the given base path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn name_to_path(&self, name: &str) -> PathBuf {
    self.base_path.join(name)
  }
}

impl Store for FsStore {
  async fn create_new(&self, name: &str) -> Result<(), Error> {
    let path = self.name_to_path(name);

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }

    OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(&path)
      .await
      .map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
          Error::AlreadyExists(name.to_string())
        } else {
          Error::Io(e)
        }
      })?;

    Ok(())
  }

  async fn put(&self, name: &str, data: ByteStream) -> Result<(), Error> {
    let path = self.name_to_path(name);

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }

    let mut file = File::create(path).await?;
    let mut stream = data;

    while let Some(chunk) = stream.next().await {
      let bytes = chunk?;
      file.write_all(&bytes).await?;
    }

    file.flush().await?;
    Ok(())
  }

  async fn get(&self, name: &str) -> Result<ByteStream, Error> {
    let path = self.name_to_path(name);
    let file = File::open(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(name.to_string())
      } else {
        Error::Io(e)
      }
    })?;
    let stream = ReaderStream::new(file).map(|r| r.map_err(Error::Io));
    Ok(Box::pin(stream))
  }

  async fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
    fs::rename(self.name_to_path(from), self.name_to_path(to))
      .await
      .map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
          Error::NotFound(from.to_string())
        } else {
          Error::Io(e)
        }
      })
  }

  async fn delete(&self, name: &str) -> Result<(), Error> {
    let path = self.name_to_path(name);
    fs::remove_file(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(name.to_string())
      } else {
        Error::Io(e)
      }
    })
  }

  async fn list(&self) -> Result<Vec<String>, Error> {
    let mut entries = fs::read_dir(&self.base_path).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
      if !entry.file_type().await?.is_file() {
        continue;
      }

      let name = match entry.file_name().into_string() {
        Ok(n) => n,
        Err(_) => continue,
      };

      names.push(name);
    }

    Ok(names)
  }
}
