use async_trait::async_trait;
use dairy_cms_core::storage::{ImageUpload, ObjectStorage, StorageError};
use reqwest::Method;

use crate::client::{RemoteClient, RemoteFailure};

/// Public bucket in the hosted object store.
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    client: RemoteClient,
    bucket: String,
}

impl RemoteStorage {
    pub fn new(client: RemoteClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        self.client
            .url(&format!("/storage/v1/object/public/{}/{path}", self.bucket))
    }
}

#[async_trait]
impl ObjectStorage for RemoteStorage {
    async fn upload(&self, path: &str, upload: &ImageUpload) -> Result<String, StorageError> {
        if upload.bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        let response = self
            .client
            .request(Method::POST, &format!("/storage/v1/object/{}/{path}", self.bucket))
            .header(reqwest::header::CONTENT_TYPE, &upload.content_type)
            .header("x-upsert", "false")
            .body(upload.bytes.clone())
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let failure = RemoteFailure::from_response(response).await;
            tracing::warn!(path, status = %failure.status, "image upload rejected");
            return Err(StorageError::Rejected {
                status: failure.status.as_u16(),
                message: failure.message,
            });
        }
        tracing::info!(path, bytes = upload.bytes.len(), "image uploaded");
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_points_at_bucket() {
        let client = RemoteClient::new("https://project.test", "key").unwrap();
        let storage = RemoteStorage::new(client, "site-images");
        assert_eq!(
            storage.public_url("products/a.jpg"),
            "https://project.test/storage/v1/object/public/site-images/products/a.jpg"
        );
    }
}
