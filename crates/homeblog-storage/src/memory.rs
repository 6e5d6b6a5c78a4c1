//! In-memory object store
//!
//! Behaves like an S3-compatible store for the operations sessions use: creating an
//! existing bucket fails with [`ClientError::BucketAlreadyExists`], reading a missing key
//! yields `None`, and writing into a missing bucket is an error. Contents live for the
//! lifetime of the client.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::client::{ClientError, ObjectStoreClient, ObjectStream, PutPayload};

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
struct Bucket {
    policy: Option<String>,
    objects: BTreeMap<String, StoredObject>,
}

/// Process-local [`ObjectStoreClient`]
#[derive(Debug, Default)]
pub struct InMemoryClient {
    buckets: RwLock<HashMap<String, Bucket>>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy document installed on `bucket`, if any.
    pub async fn bucket_policy(&self, bucket: &str) -> Option<String> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket).and_then(|b| b.policy.clone())
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket).and_then(|b| b.objects.get(key).cloned())
    }

    /// Keys in `bucket`, sorted.
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn no_such_bucket(bucket: &str) -> ClientError {
        ClientError::service(format!("The specified bucket does not exist: {}", bucket))
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryClient {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ClientError> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(ClientError::BucketAlreadyExists);
        }
        buckets.insert(bucket.to_string(), Bucket::default());
        Ok(())
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ClientError> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        entry.policy = Some(policy.to_string());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        payload: PutPayload,
    ) -> Result<(), ClientError> {
        // Collected before taking the lock.
        let data = payload.into_bytes().await?;

        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        entry.objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(())
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStream>, ClientError> {
        let buckets = self.buckets.read().await;
        let entry = buckets
            .get(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;

        Ok(entry.objects.get(key).map(|object| {
            let chunk: Result<Bytes, ClientError> = Ok(object.data.clone());
            Box::pin(futures::stream::iter([chunk])) as ObjectStream
        }))
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        let mut buckets = self.buckets.write().await;
        let entry = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::no_such_bucket(bucket))?;
        // Removing a missing key succeeds, as on S3.
        entry.objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn make_bucket_twice_reports_already_exists() {
        let client = InMemoryClient::new();
        assert!(!client.bucket_exists("uploads").await.unwrap());

        client.make_bucket("uploads").await.unwrap();
        assert!(client.bucket_exists("uploads").await.unwrap());

        let err = client.make_bucket("uploads").await.unwrap_err();
        assert!(matches!(err, ClientError::BucketAlreadyExists));
    }

    #[tokio::test]
    async fn missing_bucket_is_an_error_missing_key_is_none() {
        let client = InMemoryClient::new();
        assert!(client.get_object("uploads", "k").await.is_err());
        assert!(client
            .put_object("uploads", "k", "text/plain", PutPayload::from(vec![1]))
            .await
            .is_err());

        client.make_bucket("uploads").await.unwrap();
        assert!(client.get_object("uploads", "k").await.unwrap().is_none());
        client.remove_object("uploads", "k").await.unwrap();
    }

    #[tokio::test]
    async fn stores_objects_with_content_type() {
        let client = InMemoryClient::new();
        client.make_bucket("uploads").await.unwrap();
        client
            .put_object(
                "uploads",
                "1-a.txt",
                "text/plain",
                PutPayload::from(b"abc".to_vec()),
            )
            .await
            .unwrap();

        let object = client.object("uploads", "1-a.txt").await.unwrap();
        assert_eq!(object.content_type, "text/plain");
        assert_eq!(client.keys("uploads").await, vec!["1-a.txt".to_string()]);

        let mut stream = client.get_object("uploads", "1-a.txt").await.unwrap().unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(chunk, Bytes::from_static(b"abc"));
        assert!(stream.next().await.is_none());
    }
}
