//! S3-compatible object-store client built on the AWS SDK.
//!
//! Works against AWS S3 and S3-compatible stores (MinIO, ...) using static credentials
//! and path-style addressing. SDK retries are turned off: a failed call surfaces to the
//! caller, which owns the retry policy.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use futures::StreamExt;
use tokio_util::io::ReaderStream;

use crate::client::{ClientError, ObjectStoreClient, ObjectStream, PutPayload};
use crate::config::{ProviderConfig, DEFAULT_REGION};

/// [`ObjectStoreClient`] backed by `aws-sdk-s3`
#[derive(Clone, Debug)]
pub struct S3Client {
    client: Client,
    endpoint_url: String,
    region: String,
}

impl S3Client {
    /// Build a client for the provider's endpoint and credentials.
    ///
    /// No request is sent here; connection problems surface on the first operation.
    pub async fn connect(config: &ProviderConfig) -> Self {
        let endpoint_url = config.endpoint_url();
        let credentials = Credentials::new(
            config.access_key(),
            config.secret_key(),
            None,
            None,
            "homeblog-storage",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint_url.clone())
            .retry_config(RetryConfig::disabled());

        if let Some(timeout) = config.operation_timeout() {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        let sdk_config = loader.load().await;

        // Path-style addressing is required by MinIO and most S3-compatible stores.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::debug!(
            endpoint = %endpoint_url,
            region = %config.region(),
            "S3 client configured"
        );

        S3Client {
            client: Client::from_conf(s3_config),
            endpoint_url,
            region: config.region().to_string(),
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> ClientError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ClientError::with_source(DisplayErrorContext(&err).to_string(), err)
}

/// HEAD requests carry no error body, so a 404 may not be modeled as a service error.
/// Only used for `head_bucket`.
fn is_not_found_status<E>(err: &SdkError<E, HttpResponse>) -> bool {
    err.raw_response()
        .is_some_and(|response| response.status().as_u16() == 404)
}

#[async_trait]
impl ObjectStoreClient for S3Client {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, ClientError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err)
                if is_not_found_status(&err)
                    || err.as_service_error().is_some_and(|e| e.is_not_found()) =>
            {
                Ok(false)
            }
            Err(err) => Err(sdk_error(err)),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err.as_service_error().is_some_and(|e| {
                    e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists()
                }) =>
            {
                Err(ClientError::BucketAlreadyExists)
            }
            Err(err) => Err(sdk_error(err)),
        }
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), ClientError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        payload: PutPayload,
    ) -> Result<(), ClientError> {
        // Single-part upload: the declared length is checked while the body is collected.
        let data = payload.into_bytes().await?;
        let content_length = data.len() as i64;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectStream>, ClientError> {
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            // Only a missing key is absence; a 404 for a missing bucket or a wrong
            // endpoint is a broken setup.
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(None);
            }
            Err(err) => return Err(sdk_error(err)),
        };

        let stream: ObjectStream = Box::pin(
            ReaderStream::new(response.body.into_async_read())
                .map(|chunk| chunk.map_err(ClientError::Io)),
        );

        Ok(Some(stream))
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(())
    }
}
