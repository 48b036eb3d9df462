pub mod file;

pub use file::{is_valid_bucket_name, BucketQuery, StoredFile, UploadFileRequest};

use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{Attribute, AttributeValue, Attributes, ObjectStore, PutOptions, PutPayload};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};

/// Metadata key carrying the display name of an object
const NAME_METADATA: &str = "name";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found")]
    NotFound,

    #[error("bucket {0} is empty")]
    BucketEmpty(String),

    #[error("invalid bucket name: {0}")]
    InvalidBucket(String),

    #[error("object store call timed out")]
    Timeout,

    #[error(transparent)]
    Backend(object_store::Error),
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => StorageError::NotFound,
            other => StorageError::Backend(other),
        }
    }
}

/// Bucketed file storage over any `object_store` backend.
///
/// A logical bucket is a key prefix: objects live at `<bucket>/<file id>`
/// and carry their display name in object metadata. Buckets exist as soon
/// as they hold an object.
#[derive(Clone)]
pub struct FileStore {
    store: Arc<dyn ObjectStore>,
    default_bucket: String,
    timeout: Duration,
}

impl FileStore {
    pub fn new(store: Arc<dyn ObjectStore>, default_bucket: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            default_bucket: default_bucket.into(),
            timeout,
        }
    }

    /// Process-local store, used for development and tests
    pub fn in_memory(default_bucket: impl Into<String>, timeout: Duration) -> Self {
        Self::new(Arc::new(InMemory::new()), default_bucket, timeout)
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let store: Arc<dyn ObjectStore> = match config.backend {
            StorageBackend::Memory => {
                info!("Using in-memory object store");
                Arc::new(InMemory::new())
            }
            StorageBackend::S3 => {
                let endpoint = config.endpoint();
                info!("Using S3 object store at {} (bucket {})", endpoint, config.bucket);
                let s3 = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_bucket_name(&config.bucket)
                    .with_access_key_id(&config.access_key)
                    .with_secret_access_key(&config.secret_access_key)
                    .with_region(&config.region)
                    .with_allow_http(!config.use_tls)
                    .with_virtual_hosted_style_request(false)
                    .build()
                    .map_err(StorageError::Backend)?;
                Arc::new(s3)
            }
        };
        Ok(Self::new(store, config.default_bucket.clone(), config.timeout()))
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    /// Bucket named by the request, or the default one
    pub fn resolve_bucket(&self, requested: Option<&str>) -> Result<String, StorageError> {
        let bucket = requested.unwrap_or(&self.default_bucket);
        if !is_valid_bucket_name(bucket) {
            return Err(StorageError::InvalidBucket(bucket.to_string()));
        }
        Ok(bucket.to_string())
    }

    pub async fn upload(
        &self,
        bucket: &str,
        id: Uuid,
        name: &str,
        content: Vec<u8>,
    ) -> Result<StoredFile, StorageError> {
        let size = content.len() as i64;
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::Metadata(Cow::Borrowed(NAME_METADATA)),
            AttributeValue::from(name.to_string()),
        );
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.bounded(
            self.store
                .put_opts(&object_path(bucket, id), PutPayload::from(content), opts),
        )
        .await?;

        debug!("Stored {} ({} bytes) in bucket {}", id, size, bucket);
        Ok(StoredFile {
            id,
            name: name.to_string(),
            size,
            bucket: bucket.to_string(),
            bytes: None,
        })
    }

    pub async fn get(&self, bucket: &str, id: Uuid) -> Result<StoredFile, StorageError> {
        let result = self.bounded(self.store.get(&object_path(bucket, id))).await?;
        let name = display_name(&result.attributes).unwrap_or_else(|| id.to_string());
        let bytes = self.bounded(result.bytes()).await?;

        Ok(StoredFile {
            id,
            name,
            size: bytes.len() as i64,
            bucket: bucket.to_string(),
            bytes: Some(bytes.to_vec()),
        })
    }

    /// Every file in `bucket`, with content. An empty bucket is an error the
    /// caller decides how to present.
    pub async fn list_bucket(&self, bucket: &str) -> Result<Vec<StoredFile>, StorageError> {
        let prefix = Path::from(bucket);
        let objects: Vec<_> = self
            .bounded(self.store.list(Some(&prefix)).try_collect())
            .await?;

        if objects.is_empty() {
            return Err(StorageError::BucketEmpty(bucket.to_string()));
        }

        let mut files = Vec::with_capacity(objects.len());
        for meta in objects {
            let id = match meta.location.filename().map(Uuid::parse_str) {
                Some(Ok(id)) => id,
                _ => {
                    warn!("Skipping foreign object {} in bucket {}", meta.location, bucket);
                    continue;
                }
            };
            match self.get(bucket, id).await {
                Ok(file) => files.push(file),
                // Deleted between list and read
                Err(StorageError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(files)
    }

    /// Remove one object. Deleting an absent object reports `NotFound`.
    pub async fn delete(&self, bucket: &str, id: Uuid) -> Result<(), StorageError> {
        let path = object_path(bucket, id);
        self.bounded(self.store.head(&path)).await?;
        self.bounded(self.store.delete(&path)).await?;
        debug!("Deleted {} from bucket {}", id, bucket);
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = object_store::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(StorageError::from),
            Err(_) => Err(StorageError::Timeout),
        }
    }
}

fn object_path(bucket: &str, id: Uuid) -> Path {
    Path::from_iter([bucket.to_string(), id.to_string()])
}

fn display_name(attributes: &Attributes) -> Option<String> {
    attributes
        .get(&Attribute::Metadata(Cow::Borrowed(NAME_METADATA)))
        .map(|v| AsRef::<str>::as_ref(v).to_string())
}
