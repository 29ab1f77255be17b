//! Retrieval of rendered outputs
//!
//! Names are validated against the output naming scheme before any path is
//! built, so traversal attempts and guesses at unrelated files are `NotFound`.

use axum::body::Bytes;
use futures::Stream;
use tokio::io::AsyncReadExt;

use crate::storage::{ArtifactStore, OutputId, StorageError};

/// Read size for streamed downloads
const CHUNK_SIZE: usize = 64 * 1024;

/// An opened output ready to stream
#[derive(Debug)]
pub struct Download {
    pub id: OutputId,
    pub size: u64,
    pub file: tokio::fs::File,
}

impl Download {
    /// Consume the download as a stream of byte chunks
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        chunk_stream(self.file)
    }
}

/// Resolve and open an output by its client-supplied name
pub async fn fetch(store: &ArtifactStore, name: &str) -> Result<Download, StorageError> {
    let path = store.resolve_output(name).await?;
    let id = OutputId::parse(name).ok_or_else(|| StorageError::NotFound(name.to_string()))?;

    // Removed between the existence check and open: still NotFound
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Err(e) => return Err(StorageError::Read(e)),
    };
    let size = file.metadata().await.map_err(StorageError::Read)?.len();

    tracing::debug!(output_id = %id, size, "Serving output");

    Ok(Download { id, size, file })
}

fn chunk_stream(file: tokio::fs::File) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    futures::stream::unfold(Some(file), |state| async move {
        let mut file = state?;
        let mut buf = vec![0u8; CHUNK_SIZE];
        match file.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), Some(file)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}
