//! Object-store client boundary
//!
//! Sessions talk to the object store only through [`ObjectStoreClient`]. Any
//! S3-compatible client that can check, create and configure buckets and put, get and
//! remove objects satisfies it.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by an object-store client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// `make_bucket` lost a creation race, or the bucket was created out of band
    #[error("Bucket already exists")]
    BucketAlreadyExists,

    #[error("Payload length mismatch: declared {declared} bytes, got {actual}")]
    LengthMismatch { declared: u64, actual: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ClientError {
    pub fn service(message: impl Into<String>) -> Self {
        ClientError::Service {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ClientError::Service {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Object body returned by [`ObjectStoreClient::get_object`]
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, ClientError>> + Send>>;

/// Object body handed to [`ObjectStoreClient::put_object`]
pub enum PutPayload {
    Bytes(Bytes),
    Stream {
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        length: u64,
    },
}

impl PutPayload {
    /// Content length reported to the object store.
    pub fn len(&self) -> u64 {
        match self {
            PutPayload::Bytes(bytes) => bytes.len() as u64,
            PutPayload::Stream { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the payload, checking a stream yields exactly its declared length.
    pub async fn into_bytes(self) -> Result<Bytes, ClientError> {
        match self {
            PutPayload::Bytes(bytes) => Ok(bytes),
            PutPayload::Stream { reader, length } => {
                let mut buffer = Vec::with_capacity(length.min(8 * 1024 * 1024) as usize);
                // One byte past the declared length is enough to detect an overlong stream.
                reader
                    .take(length.saturating_add(1))
                    .read_to_end(&mut buffer)
                    .await?;

                let actual = buffer.len() as u64;
                if actual != length {
                    return Err(ClientError::LengthMismatch {
                        declared: length,
                        actual,
                    });
                }
                Ok(Bytes::from(buffer))
            }
        }
    }
}

impl From<Bytes> for PutPayload {
    fn from(bytes: Bytes) -> Self {
        PutPayload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for PutPayload {
    fn from(data: Vec<u8>) -> Self {
        PutPayload::Bytes(Bytes::from(data))
    }
}

impl fmt::Debug for PutPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutPayload::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            PutPayload::Stream { length, .. } => {
                f.debug_struct("Stream").field("length", length).finish()
            }
        }
    }
}

/// Minimal S3-compatible client surface used by storage sessions.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ClientError>;

    /// Create a bucket. Reports [`ClientError::BucketAlreadyExists`] if it already exists.
    async fn make_bucket(&self, bucket: &str) -> Result<(), ClientError>;

    /// Replace the bucket's access policy with the given JSON document.
    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ClientError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        payload: PutPayload,
    ) -> Result<(), ClientError>;

    /// Open the object for reading, `None` if the key doesn't exist.
    async fn get_object(&self, bucket: &str, key: &str)
        -> Result<Option<ObjectStream>, ClientError>;

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), ClientError>;
}
