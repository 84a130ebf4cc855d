//! Secondary order store used when the database write fails.
//!
//! The file holds one JSON array, newest record first. Every append rewrites
//! the whole file. Appends from this process are serialized, but nothing
//! protects the file from other writers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use crate::{error::FallbackError, prelude::*, sv::order::Payload};

/// The client payload as received, plus the keys the store injects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackOrder {
  pub id: i64,
  pub created_at: String,
  #[serde(flatten)]
  pub payload: Payload,
}

pub struct Fallback {
  path: PathBuf,
  lock: Mutex<()>,
}

impl Fallback {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), lock: Mutex::new(()) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Prepends `payload` to the file and returns the generated id.
  pub async fn append(&self, payload: &Payload) -> Result<i64, FallbackError> {
    let _guard = self.lock.lock().await;

    let mut records = self.read().await?;

    let now = Utc::now();
    let newest = records.first().map(|r| r.id).unwrap_or(i64::MIN);
    let id = now.timestamp_millis().max(newest.saturating_add(1));

    // Injected keys replace client keys of the same name
    let mut payload = payload.clone();
    payload.remove("id");
    payload.remove("createdAt");

    records.insert(
      0,
      FallbackOrder {
        id,
        created_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        payload,
      },
    );

    if let Some(dir) = self.path.parent()
      && !dir.as_os_str().is_empty()
    {
      fs::create_dir_all(dir).await?;
    }
    fs::write(&self.path, json::to_vec_pretty(&records)?).await?;

    debug!("Fallback order {id} written to {}", self.path.display());
    Ok(id)
  }

  pub async fn all(&self) -> Result<Vec<FallbackOrder>, FallbackError> {
    let _guard = self.lock.lock().await;
    self.read().await
  }

  async fn read(&self) -> Result<Vec<FallbackOrder>, FallbackError> {
    let bytes = match fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return Ok(Vec::new());
      }
      Err(err) => return Err(err.into()),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Vec::new());
    }

    Ok(json::from_slice(&bytes)?)
  }
}
