//! Snapshot persistence for the car store
//!
//! The whole collection is written as one JSON array on every save. Writes go
//! to a sibling temp file first and are renamed over the target, so a reader
//! never observes a half-written file.

use crate::model::Car;
use crate::store::error::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const EMPTY_SNAPSHOT: &[u8] = b"[]\n";

// ============================================================================
// Storage Seam
// ============================================================================

/// Durable home of the full record collection.
///
/// `save` always receives the complete collection and must replace whatever
/// was stored before.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    async fn load(&self) -> Result<Vec<Car>>;
    async fn save(&self, cars: &[Car]) -> Result<()>;
}

// ============================================================================
// JSON File Storage
// ============================================================================

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Opens the backing file, creating it with an empty collection when it
    /// does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let exists = fs::try_exists(&path)
            .await
            .map_err(|err| StoreError::io(&path, err))?;

        if !exists {
            info!(path = %path.display(), "store file missing, creating an empty one");
            atomic_write(&path, EMPTY_SNAPSHOT).await?;
        }

        Ok(Self { path })
    }
}

#[async_trait]
impl SnapshotStorage for JsonFileStorage {
    async fn load(&self) -> Result<Vec<Car>> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        let cars = decode_snapshot(&self.path, &bytes)?;
        debug!(path = %self.path.display(), records = cars.len(), "loaded store file");
        Ok(cars)
    }

    async fn save(&self, cars: &[Car]) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(cars).map_err(StoreError::Encode)?;
        bytes.push(b'\n');
        atomic_write(&self.path, &bytes).await?;
        debug!(path = %self.path.display(), records = cars.len(), "saved store file");
        Ok(())
    }
}

/// Parses a stored snapshot. A zero-length or whitespace-only file counts as
/// an empty collection.
fn decode_snapshot(path: &Path, bytes: &[u8]) -> Result<Vec<Car>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let cars: Vec<Car> =
        serde_json::from_slice(bytes).map_err(|err| StoreError::corrupt(path, err))?;

    let mut seen = HashSet::with_capacity(cars.len());
    for car in &cars {
        if car.id < 0 {
            return Err(StoreError::corrupt(
                path,
                format!("negative record id {}", car.id),
            ));
        }
        if !seen.insert(car.id) {
            return Err(StoreError::corrupt(
                path,
                format!("duplicate record id {}", car.id),
            ));
        }
    }

    Ok(cars)
}

/// `cars.json` -> `cars.json.tmp`, so the temp file never aliases the target.
fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|err| StoreError::io(parent, err))?;
    }

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|err| StoreError::io(&tmp, err))?;
    file.write_all(bytes)
        .await
        .map_err(|err| StoreError::io(&tmp, err))?;
    file.sync_all()
        .await
        .map_err(|err| StoreError::io(&tmp, err))?;
    drop(file);

    fs::rename(&tmp, path)
        .await
        .map_err(|err| StoreError::io(path, err))?;
    Ok(())
}
