//! Object storage for uploaded images.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// A file chosen in an admin form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload is empty")]
    Empty,

    #[error("storage rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `upload` at `path` and return its public URL.
    async fn upload(&self, path: &str, upload: &ImageUpload) -> Result<String, StorageError>;
}

/// Keeps uploads in memory and hands out URLs under `base_url`.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    base_url: String,
    objects: Arc<RwLock<HashMap<String, ImageUpload>>>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::default(),
        }
    }

    pub async fn get(&self, path: &str) -> Option<ImageUpload> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, path: &str, upload: &ImageUpload) -> Result<String, StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        self.objects
            .write()
            .await
            .insert(path.to_string(), upload.clone());
        Ok(format!("{}/{path}", self.base_url))
    }
}
