use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::storage::{FileStore, StoredFile, UploadFileRequest};

#[derive(Clone)]
pub struct FileService {
    store: FileStore,
}

impl FileService {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub async fn upload(
        &self,
        bucket: Option<&str>,
        req: UploadFileRequest,
    ) -> Result<StoredFile, ServiceError> {
        let bucket = self.store.resolve_bucket(bucket)?;
        if req.name.is_empty() {
            return Err(ServiceError::validation("name", "name is empty"));
        }
        if let Some(size) = req.size {
            if size != req.bytes.len() as i64 {
                return Err(ServiceError::validation(
                    "size",
                    "size does not match content length",
                ));
            }
        }

        let id = Uuid::new_v4();
        let file = self.store.upload(&bucket, id, &req.name, req.bytes).await?;
        info!("Uploaded file {} to bucket {}", file.id, file.bucket);
        Ok(file)
    }

    pub async fn get(&self, bucket: Option<&str>, id: Uuid) -> Result<StoredFile, ServiceError> {
        let bucket = self.store.resolve_bucket(bucket)?;
        Ok(self.store.get(&bucket, id).await?)
    }

    pub async fn list(&self, bucket: Option<&str>) -> Result<Vec<StoredFile>, ServiceError> {
        let bucket = self.store.resolve_bucket(bucket)?;
        Ok(self.store.list_bucket(&bucket).await?)
    }

    pub async fn delete(&self, bucket: Option<&str>, id: Uuid) -> Result<(), ServiceError> {
        let bucket = self.store.resolve_bucket(bucket)?;
        self.store.delete(&bucket, id).await?;
        info!("Deleted file {} from bucket {}", id, bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn service() -> FileService {
        FileService::new(FileStore::in_memory("files", Duration::from_secs(5)))
    }

    fn upload(name: &str, bytes: &[u8]) -> UploadFileRequest {
        UploadFileRequest {
            name: name.to_string(),
            size: Some(bytes.len() as i64),
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn defaults_to_configured_bucket() {
        let svc = service();
        let file = svc.upload(None, upload("a.txt", b"abc")).await.unwrap();
        assert_eq!(file.bucket, "files");
        assert_eq!(svc.get(None, file.id).await.unwrap().bytes.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn rejects_size_mismatch_and_empty_name() {
        let svc = service();
        let mut req = upload("a.txt", b"abc");
        req.size = Some(4);
        assert!(matches!(
            svc.upload(None, req).await,
            Err(ServiceError::ValidationFailed { field: "size", .. })
        ));

        assert!(matches!(
            svc.upload(None, upload("", b"abc")).await,
            Err(ServiceError::ValidationFailed { field: "name", .. })
        ));
    }

    #[tokio::test]
    async fn invalid_bucket_name() {
        let svc = service();
        assert!(matches!(
            svc.upload(Some("Not Valid"), upload("a.txt", b"abc")).await,
            Err(ServiceError::ValidationFailed { field: "bucketName", .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_and_empty_bucket() {
        let svc = service();
        assert!(matches!(
            svc.get(None, Uuid::new_v4()).await,
            Err(ServiceError::NotFound("file"))
        ));
        assert!(matches!(svc.list(Some("empty")).await, Err(ServiceError::BucketEmpty(_))));
    }

    #[tokio::test]
    async fn ids_are_server_assigned_and_unique() {
        let svc = service();
        let a = svc.upload(None, upload("same.txt", b"1")).await.unwrap();
        let b = svc.upload(None, upload("same.txt", b"2")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(svc.list(None).await.unwrap().len(), 2);
    }
}
