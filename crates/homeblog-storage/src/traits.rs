//! Storage abstraction traits
//!
//! This module defines the capability contract the host consumes: a [`Storage`] provider
//! that opens [`Session`]s. Host code only depends on these traits and stays agnostic to
//! which object store backs them.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use homeblog_core::{ConfigError, Media, StorageBackend};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::client::ClientError;

/// Backend call that failed, reported in [`StorageError::Backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckBucket,
    CreateBucket,
    SetBucketPolicy,
    Upload,
    Download,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CheckBucket => "check bucket",
            Operation::CreateBucket => "create bucket",
            Operation::SetBucketPolicy => "set bucket policy",
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Storage operation errors
///
/// A missing object on download is not an error: [`Session::get`] reports it as `false`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to {operation} {target}: {source}")]
    Backend {
        operation: Operation,
        /// `bucket` or `bucket/key`
        target: String,
        #[source]
        source: ClientError,
    },

    #[error("Storage session is closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn backend(operation: Operation, target: impl Into<String>, source: ClientError) -> Self {
        StorageError::Backend {
            operation,
            target: target.into(),
            source,
        }
    }

    /// The failed backend operation, if this is a backend error.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            StorageError::Backend { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage provider contract
///
/// Providers hold no per-call state and can be shared across tasks.
pub trait Storage: Send + Sync {
    /// Open a new session. Never performs network I/O.
    fn open_session(&self) -> Box<dyn Session>;

    /// Public URL of the object for `media`/`filename`, or `None` if `filename` is blank.
    fn public_url(&self, media: &Media, filename: &str) -> Option<String>;

    /// Object key for `media`/`filename` under the provider's naming policy.
    fn resource_name(&self, media: &Media, filename: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Short-lived unit of work against one bucket.
///
/// Every call is an independent round trip; there are no multi-operation transactions.
/// Dropping the returned futures cancels the underlying transport call.
#[async_trait]
pub trait Session: Send + Sync {
    /// Upload an in-memory payload and return the object key.
    ///
    /// The bucket is created (with a public-read policy) first if it doesn't exist.
    async fn put(
        &self,
        media: &Media,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String>;

    /// Upload from a reader of known length and return the object key.
    ///
    /// Object stores need the content length up front for a single-part upload, so
    /// `content_length` must match what the reader yields; a mismatch fails the upload.
    async fn put_stream(
        &self,
        media: &Media,
        filename: &str,
        content_type: &str,
        content_length: u64,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Stream the object into `sink`. Returns `false` if the object doesn't exist.
    async fn get(
        &self,
        media: &Media,
        filename: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> StorageResult<bool>;

    /// Delete the object. Returns `true` once the backend accepted the delete.
    async fn delete(&self, media: &Media, filename: &str) -> StorageResult<bool>;

    /// Create the bucket and install its public-read policy if it doesn't exist yet.
    ///
    /// Returns `true` if this call created the bucket.
    async fn ensure_bucket(&self) -> StorageResult<bool>;

    /// Release the session's resources. Safe to call more than once.
    fn close(&mut self);
}
