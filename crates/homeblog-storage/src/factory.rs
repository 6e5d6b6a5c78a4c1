//! Provider construction and registration.
//!
//! Discrete credentials and connection strings are two equivalent ways to build the same
//! provider; both end up as a [`ProviderConfig`] before any client is created.

#[cfg(feature = "storage-memory")]
use crate::InMemoryClient;
#[cfg(feature = "storage-s3")]
use crate::S3Client;
use crate::{ProviderConfig, Storage, StorageBackend, StorageProvider, StorageResult};
#[cfg(feature = "storage-s3")]
use homeblog_core::NamingPolicy;
use homeblog_core::FileStorageConfig;
#[cfg(not(all(feature = "storage-s3", feature = "storage-memory")))]
use homeblog_core::{config::BACKEND_VAR, ConfigError};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &FileStorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let provider_config = ProviderConfig::from_file_storage_config(config)?;

    tracing::info!(
        backend = %config.backend,
        endpoint = %provider_config.endpoint(),
        bucket = %provider_config.bucket(),
        naming = %provider_config.naming(),
        secure = provider_config.secure(),
        "Configuring file storage"
    );

    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => Ok(Arc::new(connect_s3(provider_config).await)),

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(ConfigError::invalid_value(
            BACKEND_VAR,
            "s3 (storage-s3 feature not enabled)",
        )
        .into()),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => Ok(Arc::new(in_memory(provider_config))),

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(ConfigError::invalid_value(
            BACKEND_VAR,
            "memory (storage-memory feature not enabled)",
        )
        .into()),
    }
}

/// Build an S3-backed provider from discrete credentials.
///
/// # Arguments
/// * `endpoint` - Object store host and port (e.g. "localhost:9000")
/// * `access_key` / `secret_key` - Static credentials
/// * `bucket` - Bucket holding the media, created on first upload
/// * `naming` - Object key naming policy
/// * `secure` - Use HTTPS
#[cfg(feature = "storage-s3")]
pub async fn connect(
    endpoint: &str,
    access_key: &str,
    secret_key: &str,
    bucket: &str,
    naming: NamingPolicy,
    secure: bool,
) -> StorageResult<StorageProvider> {
    let config = ProviderConfig::new(endpoint, access_key, secret_key, bucket, naming, secure)?;
    Ok(connect_s3(config).await)
}

/// Build an S3-backed provider from a connection string such as
/// `endpoint=localhost:9000;accessKey=minioadmin;secretKey=minioadmin;secure=false`.
#[cfg(feature = "storage-s3")]
pub async fn connect_with_connection_string(
    connection_string: &str,
    bucket: &str,
    naming: NamingPolicy,
) -> StorageResult<StorageProvider> {
    let config = ProviderConfig::from_connection_string(connection_string, bucket, naming)?;
    Ok(connect_s3(config).await)
}

#[cfg(feature = "storage-s3")]
pub async fn connect_s3(config: ProviderConfig) -> StorageProvider {
    let client = S3Client::connect(&config).await;
    StorageProvider::new(config, Arc::new(client), StorageBackend::S3)
}

#[cfg(feature = "storage-memory")]
pub fn in_memory(config: ProviderConfig) -> StorageProvider {
    StorageProvider::new(config, Arc::new(InMemoryClient::new()), StorageBackend::Memory)
}
