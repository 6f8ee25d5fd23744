use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing_subscriber::EnvFilter;

use depot_artifact::{ByteStream, FsStore, from_bytes};
use depot_store::{ReleaseRequest, ReleaseStore};

/// Depot - a local file-based store for release artifacts
#[derive(Parser)]
#[command(name = "depot")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.depot)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Publish a new release
  Publish {
    /// Version string for the new release, e.g. "1.0.0"
    #[arg(long)]
    version: String,

    /// Free-text description of the release
    #[arg(long, default_value = "")]
    description: String,

    /// Path to the payload file (reads stdin when omitted)
    payload: Option<PathBuf>,
  },

  /// List all published releases
  List,

  /// Unpublish a release by identifier
  Unpublish {
    /// Identifier of the release to remove
    id: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = match cli.verbose {
    0 => EnvFilter::new("warn"),
    1 => EnvFilter::new("info"),
    2 => EnvFilter::new("debug"),
    _ => EnvFilter::new("trace"),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .init();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".depot")
  });

  tracing::debug!(data_dir = %data_dir.display(), "using data directory");

  match cli.command {
    Some(Commands::Publish {
      version,
      description,
      payload,
    }) => {
      publish(data_dir, version, description, payload)?;
    }
    Some(Commands::List) => {
      list(data_dir)?;
    }
    Some(Commands::Unpublish { id }) => {
      unpublish(data_dir, id)?;
    }
    None => {
      println!("depot - use --help to see available commands");
    }
  }

  Ok(())
}

fn publish(
  data_dir: PathBuf,
  version: String,
  description: String,
  payload: Option<PathBuf>,
) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { publish_async(data_dir, version, description, payload).await })
}

async fn publish_async(
  data_dir: PathBuf,
  version: String,
  description: String,
  payload: Option<PathBuf>,
) -> Result<()> {
  let store = open_store(&data_dir).await?;
  let payload = payload_stream(payload).await?;

  let release = store
    .publish(
      ReleaseRequest {
        version,
        description,
      },
      payload,
    )
    .await
    .context("failed to publish release")?;

  eprintln!("Published release: {}", release.id);
  println!("{}", serde_json::to_string_pretty(&release)?);

  Ok(())
}

fn list(data_dir: PathBuf) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { list_async(data_dir).await })
}

async fn list_async(data_dir: PathBuf) -> Result<()> {
  let store = open_store(&data_dir).await?;

  let releases = store.list().await.context("failed to list releases")?;

  eprintln!("Found {} releases", releases.len());
  println!("{}", serde_json::to_string_pretty(&releases)?);

  Ok(())
}

fn unpublish(data_dir: PathBuf, id: String) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { unpublish_async(data_dir, id).await })
}

async fn unpublish_async(data_dir: PathBuf, id: String) -> Result<()> {
  let store = open_store(&data_dir).await?;

  store
    .unpublish(&id)
    .await
    .context("failed to unpublish release")?;

  eprintln!("Unpublished release: {id}");

  Ok(())
}

/// Create the storage root (restrictive permissions) and open the store.
async fn open_store(data_dir: &Path) -> Result<ReleaseStore<FsStore>> {
  let releases_dir = data_dir.join("releases");

  tokio::fs::create_dir_all(&releases_dir)
    .await
    .with_context(|| {
      format!(
        "failed to create storage directory: {}",
        releases_dir.display()
      )
    })?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(&releases_dir, std::fs::Permissions::from_mode(0o700))
      .await
      .with_context(|| {
        format!(
          "failed to restrict storage directory: {}",
          releases_dir.display()
        )
      })?;
  }

  Ok(ReleaseStore::new(FsStore::new(releases_dir)))
}

/// Open the payload as a byte stream, from a file or from stdin.
async fn payload_stream(path: Option<PathBuf>) -> Result<ByteStream> {
  match path {
    Some(path) => {
      let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("failed to open payload file: {}", path.display()))?;
      Ok(Box::pin(
        ReaderStream::new(file).map(|r| r.map_err(depot_artifact::Error::Io)),
      ))
    }
    None => {
      if std::io::stdin().is_terminal() {
        // No stdin pipe, publish an empty payload
        Ok(from_bytes(Bytes::new()))
      } else {
        Ok(Box::pin(
          ReaderStream::new(tokio::io::stdin()).map(|r| r.map_err(depot_artifact::Error::Io)),
        ))
      }
    }
  }
}
