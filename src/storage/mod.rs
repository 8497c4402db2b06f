//! S3-compatible object storage access
//!
//! The probe talks to storage through the [`ObjectStore`] trait so the
//! lifecycle can be exercised against an in-memory store in tests.
//! [`S3Client`] is the real implementation, a thin wrapper over `rust-s3`.

pub mod addressing;
pub mod client;

pub use addressing::{validate_bucket_name, AddressingStyle};
pub use client::S3Client;

use async_trait::async_trait;
use s3::error::S3Error;
use std::path::Path;
use thiserror::Error;

/// Storage client errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Rejected locally before any request was sent
    #[error("Invalid bucket name \"{0}\": bucket names must match [a-zA-Z0-9._-] and be 1-255 characters")]
    InvalidBucketName(String),

    /// Non-success response from the service
    #[error("HTTP {status}: {message}")]
    Service { status: u16, message: String },

    /// Connection, TLS, timeout or body streaming failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response lacked a header the operation depends on
    #[error("Missing {0} header in response")]
    MissingHeader(&'static str),

    /// Local file access while uploading or downloading
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Service rejection with the response body folded onto one line
    pub fn service(status: u16, body: &str) -> Self {
        let message = body.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::Service {
            status,
            message: if message.is_empty() { "empty response body".to_string() } else { message },
        }
    }
}

impl From<S3Error> for StorageError {
    fn from(error: S3Error) -> Self {
        match error {
            S3Error::HttpFailWithBody(status, body) => Self::service(status, &body),
            other => Self::Transport(other.to_string()),
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// The six storage operations the probe lifecycle uses
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Upload the contents of a local file as an object
    async fn put_object(&self, bucket: &str, key: &str, source: &Path) -> StorageResult<()>;

    /// Fetch the integrity tag the service reports for an object, without quotes
    async fn head_object_etag(&self, bucket: &str, key: &str) -> StorageResult<String>;

    /// Download an object into a local file, returning the bytes written
    async fn get_object_to_file(&self, bucket: &str, key: &str, target: &Path) -> StorageResult<u64>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Delete an (empty) bucket
    async fn delete_bucket(&self, bucket: &str) -> StorageResult<()>;
}
