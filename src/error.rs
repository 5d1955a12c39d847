//! Error types for each stage of the pipeline.
//!
//! None of these ever reach the caller of the entry point: each stage
//! catches its own error, logs it, and falls back to an empty result.

use thiserror::Error;

/// The feed descriptor file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read feed config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse feed config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single feed could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unusable feed address: {0}")]
    InvalidAddress(String),

    #[error("feed returned HTTP {0}")]
    Status(u16),

    #[error("failed to read feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("not an RSS or Atom feed (rss: {rss}; atom: {atom})")]
    Parse { rss: String, atom: String },
}

/// A digest could not be written to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3_BUCKET_NAME is not set")]
    MissingBucket,

    #[error("object key {0:?} escapes the output directory")]
    InvalidKey(String),

    #[error("object store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write digest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 put_object failed: {0}")]
    S3(String),

    #[error("failed to start S3 runtime: {0}")]
    Runtime(std::io::Error),
}
