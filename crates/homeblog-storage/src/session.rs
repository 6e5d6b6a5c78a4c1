//! Storage session
//!
//! A session is bound to one client, one bucket and one naming policy. It keeps no state
//! between calls apart from the client handle, which [`StorageSession::close`] releases.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use homeblog_core::{Media, NamingPolicy};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::client::{ClientError, ObjectStoreClient, PutPayload};
use crate::keys::generate_storage_key;
use crate::policy::public_read_policy;
use crate::traits::{Operation, Session, StorageError, StorageResult};

/// Session over an [`ObjectStoreClient`]
pub struct StorageSession {
    client: Option<Arc<dyn ObjectStoreClient>>,
    bucket: String,
    naming: NamingPolicy,
}

impl StorageSession {
    pub fn new(
        client: Arc<dyn ObjectStoreClient>,
        bucket: impl Into<String>,
        naming: NamingPolicy,
    ) -> Self {
        StorageSession {
            client: Some(client),
            bucket: bucket.into(),
            naming,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    fn client(&self) -> StorageResult<&Arc<dyn ObjectStoreClient>> {
        self.client.as_ref().ok_or(StorageError::SessionClosed)
    }

    fn resource_name(&self, media: &Media, filename: &str) -> String {
        generate_storage_key(&media.id, filename, self.naming)
    }

    fn target(&self, key: &str) -> String {
        format!("{}/{}", self.bucket, key)
    }

    async fn upload(
        &self,
        media: &Media,
        filename: &str,
        content_type: &str,
        payload: PutPayload,
    ) -> StorageResult<String> {
        let client = self.client()?;
        let key = self.resource_name(media, filename);

        self.ensure_bucket().await?;

        let size = payload.len();
        let start = Instant::now();

        client
            .put_object(&self.bucket, &key, content_type, payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                StorageError::backend(Operation::Upload, self.target(&key), e)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(key)
    }

    async fn install_public_read_policy(
        &self,
        client: &dyn ObjectStoreClient,
    ) -> StorageResult<()> {
        client
            .set_bucket_policy(&self.bucket, &public_read_policy(&self.bucket))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %self.bucket, "Failed to set bucket policy");
                StorageError::backend(Operation::SetBucketPolicy, self.bucket.clone(), e)
            })
    }
}

#[async_trait]
impl Session for StorageSession {
    async fn put(
        &self,
        media: &Media,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        self.upload(media, filename, content_type, PutPayload::Bytes(data))
            .await
    }

    async fn put_stream(
        &self,
        media: &Media,
        filename: &str,
        content_type: &str,
        content_length: u64,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let payload = PutPayload::Stream {
            reader,
            length: content_length,
        };
        self.upload(media, filename, content_type, payload).await
    }

    async fn get(
        &self,
        media: &Media,
        filename: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> StorageResult<bool> {
        let client = self.client()?;
        let key = self.resource_name(media, filename);
        let start = Instant::now();

        let download_failed = |e: ClientError| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object download failed"
            );
            StorageError::backend(Operation::Download, self.target(&key), e)
        };

        let mut stream = match client.get_object(&self.bucket, &key).await {
            Ok(Some(stream)) => stream,
            Ok(None) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "Object not found");
                return Ok(false);
            }
            Err(e) => return Err(download_failed(e)),
        };

        let mut size = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(download_failed)?;
            sink.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        sink.flush().await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object download successful"
        );

        Ok(true)
    }

    async fn delete(&self, media: &Media, filename: &str) -> StorageResult<bool> {
        let client = self.client()?;
        let key = self.resource_name(media, filename);
        let start = Instant::now();

        client.remove_object(&self.bucket, &key).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object delete failed"
            );
            StorageError::backend(Operation::Delete, self.target(&key), e)
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object delete successful"
        );

        Ok(true)
    }

    async fn ensure_bucket(&self) -> StorageResult<bool> {
        let client = self.client()?;

        let exists = client.bucket_exists(&self.bucket).await.map_err(|e| {
            tracing::error!(error = %e, bucket = %self.bucket, "Failed to check bucket");
            StorageError::backend(Operation::CheckBucket, self.bucket.clone(), e)
        })?;

        if exists {
            tracing::debug!(bucket = %self.bucket, "Bucket exists");
            return Ok(false);
        }

        match client.make_bucket(&self.bucket).await {
            Ok(()) => {}
            Err(ClientError::BucketAlreadyExists) => {
                // Lost the creation race; reinstalling the same policy is idempotent.
                tracing::warn!(bucket = %self.bucket, "Bucket was created concurrently");
                self.install_public_read_policy(&**client).await?;
                return Ok(false);
            }
            Err(e) => {
                tracing::error!(error = %e, bucket = %self.bucket, "Failed to create bucket");
                return Err(StorageError::backend(
                    Operation::CreateBucket,
                    self.bucket.clone(),
                    e,
                ));
            }
        }

        self.install_public_read_policy(&**client).await?;

        tracing::info!(bucket = %self.bucket, "Bucket created with public read policy");
        Ok(true)
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(bucket = %self.bucket, "Storage session closed");
        }
    }
}

impl Drop for StorageSession {
    fn drop(&mut self) {
        self.close();
    }
}
