//! Local filesystem artifact store
//!
//! Two roots share the whole process: one for transient uploads, one for
//! rendered outputs. Identifiers are random and never reused, so concurrent
//! conversions never touch the same file and no locking is needed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use super::error::StorageError;
use super::types::{OutputId, OutputTarget, UploadArtifact, UploadId};

/// Fallback content type when neither the client nor the name tells us
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Filesystem-backed store for uploads and outputs
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<ArtifactStoreInner>,
}

struct ArtifactStoreInner {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(ArtifactStoreInner {
                upload_dir: upload_dir.into(),
                output_dir: output_dir.into(),
            }),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.inner.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.inner.output_dir
    }

    /// Create both storage roots. Idempotent; run once before serving.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        for dir in [self.upload_dir(), self.output_dir()] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StorageError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        tracing::info!(
            upload_dir = %self.upload_dir().display(),
            output_dir = %self.output_dir().display(),
            "Artifact store initialized"
        );

        Ok(())
    }

    /// Persist an upload under a freshly generated identifier.
    ///
    /// The file is opened create-new, so an existing identifier is never
    /// overwritten. A partially written file is removed before returning.
    pub async fn save_upload(
        &self,
        data: &[u8],
        declared_name: &str,
        declared_type: Option<&str>,
    ) -> Result<UploadArtifact, StorageError> {
        let id = UploadId::generate();
        let path = self.upload_path(&id);

        let metadata = write_new_file(&path, data)
            .await
            .map_err(StorageError::Write)?;

        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let content_type = declared_type
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| mime_guess::from_path(declared_name).first().map(|m| m.to_string()))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        tracing::debug!(
            upload_id = %id,
            size = metadata.len(),
            content_type = %content_type,
            "Upload stored"
        );

        Ok(UploadArtifact {
            id,
            original_name: declared_name.to_string(),
            size: metadata.len(),
            content_type,
            created_at,
            path,
        })
    }

    /// Remove an upload. Removing an absent upload succeeds.
    pub async fn delete_upload(&self, id: &UploadId) -> Result<(), StorageError> {
        remove_if_present(&self.upload_path(id))
            .await
            .map_err(StorageError::Remove)
    }

    pub async fn upload_exists(&self, id: &UploadId) -> bool {
        tokio::fs::try_exists(self.upload_path(id))
            .await
            .unwrap_or(false)
    }

    /// Location the renderer writes to for a given upload
    pub fn output_target(&self, id: &UploadId) -> OutputTarget {
        let output_id = id.output_id();
        let path = self.inner.output_dir.join(output_id.as_str());
        OutputTarget { id: output_id, path }
    }

    /// Best-effort removal of whatever sits at an output identifier
    pub async fn discard_output(&self, id: &OutputId) -> Result<(), StorageError> {
        remove_if_present(&self.inner.output_dir.join(id.as_str()))
            .await
            .map_err(StorageError::Remove)
    }

    /// Resolve a client-supplied output name to an existing file path.
    ///
    /// Names outside the naming scheme are `NotFound` without touching the
    /// filesystem. Does not open the file.
    pub async fn resolve_output(&self, name: &str) -> Result<PathBuf, StorageError> {
        let id = OutputId::parse(name).ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let path = self.inner.output_dir.join(id.as_str());

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(StorageError::NotFound(name.to_string())),
        }
    }

    fn upload_path(&self, id: &UploadId) -> PathBuf {
        self.inner.upload_dir.join(id.as_str())
    }
}

/// Write a file that must not exist yet and report its metadata.
///
/// Once the file is created, any later failure removes it again.
async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<std::fs::Metadata> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = async {
        file.write_all(data).await?;
        file.flush().await?;
        file.metadata().await
    }
    .await;

    if written.is_err() {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
    }

    written
}

async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
