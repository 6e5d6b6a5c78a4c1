//! Provider configuration
//!
//! Built once, from discrete credentials or a connection string, and validated on
//! construction: endpoint, access key, secret key and bucket are never blank afterwards.

use std::fmt;
use std::time::Duration;

use homeblog_core::{ConfigError, FileStorageConfig, NamingPolicy, StorageCredentials};

use crate::connection::ConnectionParams;

pub const DEFAULT_BUCKET: &str = "uploads";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Immutable settings shared by a provider and every session it opens.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    endpoint: String,
    access_key: String,
    secret_key: String,
    bucket: String,
    secure: bool,
    naming: NamingPolicy,
    region: String,
    operation_timeout: Option<Duration>,
}

impl ProviderConfig {
    /// Create a configuration from discrete credentials.
    ///
    /// # Arguments
    /// * `endpoint` - Object store host and port, without scheme (e.g. "localhost:9000")
    /// * `access_key` / `secret_key` - Static credentials
    /// * `bucket` - Bucket that holds the media
    /// * `naming` - How object keys are derived from media
    /// * `secure` - Use HTTPS for the transport and for public URLs
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
        naming: NamingPolicy,
        secure: bool,
    ) -> Result<Self, ConfigError> {
        fn required(value: String, name: &'static str) -> Result<String, ConfigError> {
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(ConfigError::MissingField(name));
            }
            Ok(value)
        }

        Ok(ProviderConfig {
            endpoint: required(endpoint.into(), "endpoint")?,
            access_key: required(access_key.into(), "accessKey")?,
            secret_key: required(secret_key.into(), "secretKey")?,
            bucket: required(bucket.into(), "bucketName")?,
            secure,
            naming,
            region: DEFAULT_REGION.to_string(),
            operation_timeout: None,
        })
    }

    /// Create a configuration from a connection string; the bucket is supplied separately.
    pub fn from_connection_string(
        connection_string: &str,
        bucket: impl Into<String>,
        naming: NamingPolicy,
    ) -> Result<Self, ConfigError> {
        let params = ConnectionParams::parse(connection_string)?;
        Self::from_params(params, bucket, naming)
    }

    pub fn from_params(
        params: ConnectionParams,
        bucket: impl Into<String>,
        naming: NamingPolicy,
    ) -> Result<Self, ConfigError> {
        Self::new(
            params.endpoint,
            params.access_key,
            params.secret_key,
            bucket,
            naming,
            params.secure,
        )
    }

    /// Resolve the application-level file storage settings.
    pub fn from_file_storage_config(config: &FileStorageConfig) -> Result<Self, ConfigError> {
        let provider = match &config.credentials {
            StorageCredentials::ConnectionString(connection_string) => {
                Self::from_connection_string(
                    connection_string,
                    config.bucket.clone(),
                    config.naming,
                )?
            }
            StorageCredentials::Discrete {
                endpoint,
                access_key,
                secret_key,
                secure,
            } => Self::new(
                endpoint.clone(),
                access_key.clone(),
                secret_key.clone(),
                config.bucket.clone(),
                config.naming,
                *secure,
            )?,
        };

        Ok(provider
            .with_region(config.region.clone())
            .with_operation_timeout(config.operation_timeout_secs.map(Duration::from_secs)))
    }

    /// Region sent with signed requests. S3-compatible stores usually accept the default.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        if !region.trim().is_empty() {
            self.region = region;
        }
        self
    }

    /// Upper bound for each backend call, enforced by the transport.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn naming(&self) -> NamingPolicy {
        self.naming
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// `{scheme}://{endpoint}`, the base URL for both the transport and public URLs.
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}", self.scheme(), self.endpoint)
    }

    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            secure: self.secure,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("secure", &self.secure)
            .field("naming", &self.naming)
            .field("region", &self.region)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeblog_core::StorageBackend;

    #[test]
    fn blank_fields_are_rejected() {
        let naming = NamingPolicy::UniqueFileNames;
        assert_eq!(
            ProviderConfig::new("", "ak", "sk", "uploads", naming, false).unwrap_err(),
            ConfigError::MissingField("endpoint")
        );
        assert_eq!(
            ProviderConfig::new("h", " ", "sk", "uploads", naming, false).unwrap_err(),
            ConfigError::MissingField("accessKey")
        );
        assert_eq!(
            ProviderConfig::new("h", "ak", "", "uploads", naming, false).unwrap_err(),
            ConfigError::MissingField("secretKey")
        );
        assert_eq!(
            ProviderConfig::new("h", "ak", "sk", "", naming, false).unwrap_err(),
            ConfigError::MissingField("bucketName")
        );
    }

    #[test]
    fn from_connection_string_matches_discrete() {
        let parsed = ProviderConfig::from_connection_string(
            "endpoint=store.example.com;accessKey=ak;secretKey=sk;secure=true",
            "uploads",
            NamingPolicy::UniqueFolderNames,
        )
        .unwrap();
        let discrete = ProviderConfig::new(
            "store.example.com",
            "ak",
            "sk",
            "uploads",
            NamingPolicy::UniqueFolderNames,
            true,
        )
        .unwrap();

        assert_eq!(parsed, discrete);
        assert_eq!(parsed.endpoint_url(), "https://store.example.com");
        assert_eq!(
            parsed.connection_params().to_string(),
            "endpoint=store.example.com;accessKey=ak;secretKey=sk;secure=true"
        );
    }

    #[test]
    fn from_file_storage_config() {
        let config = FileStorageConfig {
            backend: StorageBackend::S3,
            bucket: "media".to_string(),
            credentials: StorageCredentials::Discrete {
                endpoint: "localhost:9000".to_string(),
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
                secure: false,
            },
            naming: NamingPolicy::UniqueFileNames,
            region: "eu-central-1".to_string(),
            operation_timeout_secs: Some(10),
        };

        let provider = ProviderConfig::from_file_storage_config(&config).unwrap();
        assert_eq!(provider.bucket(), "media");
        assert_eq!(provider.region(), "eu-central-1");
        assert_eq!(provider.operation_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(provider.endpoint_url(), "http://localhost:9000");
    }

    #[test]
    fn invalid_connection_string_in_file_storage_config() {
        let config = FileStorageConfig {
            backend: StorageBackend::S3,
            bucket: "media".to_string(),
            credentials: StorageCredentials::ConnectionString(
                "accessKey=ak;secretKey=sk".to_string(),
            ),
            naming: NamingPolicy::UniqueFileNames,
            region: DEFAULT_REGION.to_string(),
            operation_timeout_secs: None,
        };

        assert_eq!(
            ProviderConfig::from_file_storage_config(&config).unwrap_err(),
            ConfigError::MissingField("endpoint")
        );
    }

    #[test]
    fn debug_redacts_secret() {
        let config = ProviderConfig::new(
            "h",
            "ak",
            "very-secret",
            DEFAULT_BUCKET,
            NamingPolicy::default(),
            false,
        )
        .unwrap();
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
