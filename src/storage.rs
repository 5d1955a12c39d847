//! Digest persistence.
//!
//! [`ObjectStore`] is the seam between the pipeline and wherever digests end
//! up.  [`S3Store`] is the production backend; [`DirStore`] writes into a
//! local directory for runs without AWS access.
//!
//! ## For contributors
//!
//! The pipeline is synchronous.  `S3Store` owns a small current-thread tokio
//! runtime and blocks on each SDK call, so no async leaks out of this module.

use std::path::{Component, Path, PathBuf};

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{error, info};

use crate::config::Settings;
use crate::error::StorageError;

/// Content type every digest is stored with.
pub const CONTENT_TYPE: &str = "text/plain";

/// A key/value store that accepts whole objects.
pub trait ObjectStore {
    /// Create or overwrite the object at `key`.
    fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}

/// Store a digest under `key`.
///
/// Failures are logged and swallowed so the remaining feeds still get
/// processed.
pub fn save_digest(store: &dyn ObjectStore, key: &str, content: &str) {
    match store.put(key, content.as_bytes().to_vec(), CONTENT_TYPE) {
        Ok(()) => info!("Stored digest {key}"),
        Err(e) => error!("Failed to store digest {key}: {e}"),
    }
}

/// Pick the destination for this run: `DIGEST_OUTPUT_DIR` when set,
/// otherwise S3.
///
/// Never fails.  If the S3 client cannot be set up the error is logged and
/// every put is refused, so the run still completes and reports per feed.
pub fn open_store(settings: &Settings) -> Box<dyn ObjectStore> {
    if let Some(dir) = &settings.output_dir {
        info!("Writing digests to {}", dir.display());
        return Box::new(DirStore::new(dir));
    }
    match S3Store::from_env(settings.bucket.clone()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            error!("Failed to set up S3 client: {e}");
            Box::new(UnavailableStore {
                reason: e.to_string(),
            })
        }
    }
}

/// Refuses every put with the reason the real store could not be opened.
struct UnavailableStore {
    reason: String,
}

impl ObjectStore for UnavailableStore {
    fn put(&self, _: &str, _: Vec<u8>, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// S3
// ---------------------------------------------------------------------------

pub struct S3Store {
    client: aws_sdk_s3::Client,
    /// `None` when `S3_BUCKET_NAME` is unset; every put then fails.
    bucket: Option<String>,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    /// Build a client from the standard AWS environment (region, credentials).
    pub fn from_env(bucket: Option<String>) -> Result<Self, StorageError> {
        let runtime = current_thread_runtime()?;
        let config = runtime.block_on(aws_config::load_defaults(
            aws_config::BehaviorVersion::latest(),
        ));
        Ok(Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            runtime,
        })
    }
}

fn current_thread_runtime() -> Result<tokio::runtime::Runtime, StorageError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(StorageError::Runtime)
}

impl ObjectStore for S3Store {
    fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let bucket = self.bucket.as_deref().ok_or(StorageError::MissingBucket)?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send();

        self.runtime
            .block_on(request)
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

/// Writes each object to `<dir>/<key>`, creating intermediate directories
/// for keys containing `/`.  The content type is not recorded.
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ObjectStore for DirStore {
    fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        // Only plain relative segments; nothing may land outside `dir`.
        let key_path = Path::new(key);
        let relative = key_path.components().next().is_some()
            && key_path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !relative {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let path = self.dir.join(key_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, body)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
