/// Image blob storage
///
/// Uploaded images are written once under a generated, collision-resistant
/// name and served back verbatim from `/uploads/{file}`.
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid file name: {0}")]
    InvalidName(String),
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub file_name: String,
    pub size: usize,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a fresh name derived from `original_name`.
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<StoredBlob, StorageError>;

    /// Read a stored file back; `Ok(None)` when it does not exist.
    async fn get(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

/// Blob store on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Open the store, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<StoredBlob, StorageError> {
        let file_name = generate_file_name(original_name);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes).await?;
        debug!(file_name = %file_name, size = bytes.len(), "Stored upload");

        Ok(StoredBlob {
            file_name,
            size: bytes.len(),
        })
    }

    async fn get(&self, file_name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if !is_safe_file_name(file_name) {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }

        match tokio::fs::read(self.root.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// `<unix-millis>-<random 0..1e9>-<sanitised original name>`
pub fn generate_file_name(original_name: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize_file_name(original_name)
    )
}

/// Keep only the last path component and map anything outside
/// `[A-Za-z0-9._-]` to `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let sanitized: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        format!("upload-{}", Uuid::new_v4())
    } else {
        sanitized
    }
}

/// A name that stays inside the storage root.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
