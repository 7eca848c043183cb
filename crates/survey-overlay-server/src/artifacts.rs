//! Processed PDFs awaiting download
//!
//! Each artifact is a file in the processed directory owned by a
//! [`TempPath`]; the file is removed when that guard drops. A download
//! takes the guard out of the store, so an artifact is delivered at
//! most once and is never deleted while it is being read.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempPath;
use tokio::sync::Mutex;
use uuid::Uuid;

/// File name prefix of stored artifacts
pub const ARTIFACT_PREFIX: &str = "survey_with_template_overlay_";

struct Artifact {
    path: TempPath,
    created: Instant,
}

pub struct ArtifactStore {
    dir: PathBuf,
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, Artifact>>,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Write `bytes` to a new artifact and return its id
    pub async fn store(&self, bytes: Vec<u8>) -> io::Result<Uuid> {
        let id = Uuid::new_v4();
        let dir = self.dir.clone();

        let path = tokio::task::spawn_blocking(move || -> io::Result<TempPath> {
            let mut file = tempfile::Builder::new()
                .prefix(&format!("{}{}_", ARTIFACT_PREFIX, id))
                .suffix(".pdf")
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(io::Error::other)??;

        tracing::debug!(file_id = %id, path = %path.display(), "Stored artifact");
        self.entries.lock().await.insert(
            id,
            Artifact {
                path,
                created: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Remove an artifact from the store, handing its file guard to the caller
    pub async fn take(&self, id: &Uuid) -> Option<TempPath> {
        self.entries.lock().await.remove(id).map(|artifact| artifact.path)
    }

    /// Delete artifacts older than the TTL; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let expired: Vec<Artifact> = {
            let mut entries = self.entries.lock().await;
            let ids: Vec<Uuid> = entries
                .iter()
                .filter(|(_, artifact)| artifact.created.elapsed() >= self.ttl)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };

        let count = expired.len();
        if count > 0 {
            // Dropping the guards deletes the files; keep that off the runtime threads
            let _ = tokio::task::spawn_blocking(move || drop(expired)).await;
            tracing::info!(expired = count, "Swept expired artifacts");
        }
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
