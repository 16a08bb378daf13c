//! Bucket/key object transfer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{GetOptions, ObjectStore, PutPayload};
use quarry_config::S3Config;

use crate::error::StorageError;

/// Object storage addressed by bucket and key.
///
/// One client per bucket, built on first use from [`S3Config`]; buckets can
/// also be registered up front with any [`ObjectStore`] (tests use
/// `InMemory`).
pub struct ObjectStorage {
    s3: S3Config,
    buckets: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStorage {
    #[must_use]
    pub fn new(s3: S3Config) -> Self {
        Self {
            s3,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Serve `bucket` from `store` instead of S3.
    pub fn register(&self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(bucket.into(), store);
    }

    fn bucket(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = buckets.get(bucket) {
            return Ok(Arc::clone(store));
        }
        let store: Arc<dyn ObjectStore> = Arc::new(self.s3_builder(bucket).build()?);
        buckets.insert(bucket.to_string(), Arc::clone(&store));
        tracing::debug!(bucket, region = %self.s3.region, "created S3 client");
        Ok(store)
    }

    fn s3_builder(&self, bucket: &str) -> AmazonS3Builder {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&self.s3.region)
            .with_allow_http(self.s3.allow_http);
        if !self.s3.endpoint.is_empty() {
            builder = builder.with_endpoint(&self.s3.endpoint);
        }
        if self.s3.has_static_credentials() {
            builder = builder
                .with_access_key_id(&self.s3.access_key_id)
                .with_secret_access_key(&self.s3.secret_access_key);
        }
        builder
    }

    /// Fetch `bucket/key` (optionally a specific version) into `dest`.
    ///
    /// Returns the number of bytes written. Parent directories of `dest` are
    /// created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist, or
    /// another [`StorageError`] on transfer or local I/O failure.
    pub async fn download(
        &self,
        bucket: &str,
        key: &str,
        version: Option<&str>,
        dest: &Path,
    ) -> Result<u64, StorageError> {
        let store = self.bucket(bucket)?;
        let location = object_path(key)?;
        let options = GetOptions {
            version: version.map(str::to_string),
            ..GetOptions::default()
        };
        let bytes = store
            .get_opts(&location, options)
            .await
            .map_err(|e| not_found(e, bucket, key))?
            .bytes()
            .await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent, e))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| StorageError::io(dest, e))?;
        tracing::debug!(bucket, key, bytes = bytes.len(), dest = %dest.display(), "downloaded object");
        Ok(bytes.len() as u64)
    }

    /// Put the contents of `src` at `bucket/key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if `src` cannot be read or the put fails.
    pub async fn upload(&self, bucket: &str, key: &str, src: &Path) -> Result<u64, StorageError> {
        let store = self.bucket(bucket)?;
        let location = object_path(key)?;
        let bytes = tokio::fs::read(src).await.map_err(|e| StorageError::io(src, e))?;
        let size = bytes.len() as u64;
        store.put(&location, PutPayload::from(bytes)).await?;
        tracing::debug!(bucket, key, bytes = size, "uploaded object");
        Ok(size)
    }
}

fn object_path(key: &str) -> Result<ObjectPath, StorageError> {
    ObjectPath::parse(key).map_err(|source| StorageError::InvalidKey {
        key: key.to_string(),
        source,
    })
}

fn not_found(error: object_store::Error, bucket: &str, key: &str) -> StorageError {
    match error {
        object_store::Error::NotFound { .. } => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        other => StorageError::ObjectStore(other),
    }
}
