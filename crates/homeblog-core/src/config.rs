//! Configuration module
//!
//! File storage settings are read once at process start into an explicit
//! [`FileStorageConfig`] that the host passes to the storage factory. Nothing here is
//! cached in a global, so tests can build as many isolated configurations as they need
//! through [`FileStorageConfig::from_lookup`].

use std::env;
use std::fmt;

use crate::error::ConfigError;
use crate::storage_types::{NamingPolicy, StorageBackend};

const DEFAULT_REGION: &str = "us-east-1";

pub const CONNECTION_STRING_VAR: &str = "FILE_STORAGE_CONNECTION_STRING";
pub const ENDPOINT_VAR: &str = "FILE_STORAGE_ENDPOINT";
pub const ACCESS_KEY_VAR: &str = "FILE_STORAGE_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "FILE_STORAGE_SECRET_KEY";
pub const IS_SECURE_VAR: &str = "FILE_STORAGE_IS_SECURE";
pub const BUCKET_VAR: &str = "FILE_STORAGE_BUCKET";
pub const NAMING_VAR: &str = "FILE_STORAGE_NAMING";
pub const BACKEND_VAR: &str = "FILE_STORAGE_BACKEND";
pub const REGION_VAR: &str = "FILE_STORAGE_REGION";
pub const TIMEOUT_SECS_VAR: &str = "FILE_STORAGE_TIMEOUT_SECS";

/// Where the object-store credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageCredentials {
    /// `endpoint=..;accessKey=..;secretKey=..;secure=..`
    ConnectionString(String),
    Discrete {
        endpoint: String,
        access_key: String,
        secret_key: String,
        secure: bool,
    },
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageCredentials::ConnectionString(_) => f
                .debug_tuple("ConnectionString")
                .field(&"<redacted>")
                .finish(),
            StorageCredentials::Discrete {
                endpoint,
                access_key,
                secure,
                ..
            } => f
                .debug_struct("Discrete")
                .field("endpoint", endpoint)
                .field("access_key", access_key)
                .field("secret_key", &"<redacted>")
                .field("secure", secure)
                .finish(),
        }
    }
}

/// File storage configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub credentials: StorageCredentials,
    pub naming: NamingPolicy,
    pub region: String,
    pub operation_timeout_secs: Option<u64>,
}

impl FileStorageConfig {
    /// Build the configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. A connection string takes precedence over the
    /// discrete endpoint/key variables; without one, all three discrete values are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()));

        let bucket = require(BUCKET_VAR)?;

        let credentials = match get(CONNECTION_STRING_VAR) {
            Some(connection_string) => StorageCredentials::ConnectionString(connection_string),
            None => StorageCredentials::Discrete {
                endpoint: require(ENDPOINT_VAR)?,
                access_key: require(ACCESS_KEY_VAR)?,
                secret_key: require(SECRET_KEY_VAR)?,
                secure: get(IS_SECURE_VAR)
                    .map(|v| v.trim().to_lowercase().parse().unwrap_or(false))
                    .unwrap_or(false),
            },
        };

        let naming = match get(NAMING_VAR) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::invalid_value(NAMING_VAR, value))?,
            None => NamingPolicy::default(),
        };

        let backend = match get(BACKEND_VAR) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::invalid_value(BACKEND_VAR, value))?,
            None => StorageBackend::default(),
        };

        let operation_timeout_secs = match get(TIMEOUT_SECS_VAR) {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|&secs| secs > 0)
                    .ok_or_else(|| ConfigError::invalid_value(TIMEOUT_SECS_VAR, value))?,
            ),
            None => None,
        };

        Ok(FileStorageConfig {
            backend,
            bucket,
            credentials,
            naming,
            region: get(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            operation_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn connection_string_takes_precedence() {
        let config = FileStorageConfig::from_lookup(lookup(&[
            (BUCKET_VAR, "uploads"),
            (CONNECTION_STRING_VAR, "endpoint=localhost:9000;accessKey=ak;secretKey=sk"),
            (ENDPOINT_VAR, "ignored:9000"),
        ]))
        .unwrap();

        assert_eq!(config.bucket, "uploads");
        assert_eq!(
            config.credentials,
            StorageCredentials::ConnectionString(
                "endpoint=localhost:9000;accessKey=ak;secretKey=sk".to_string()
            )
        );
        assert_eq!(config.naming, NamingPolicy::UniqueFileNames);
        assert_eq!(config.backend, StorageBackend::S3);
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.operation_timeout_secs, None);
    }

    #[test]
    fn discrete_credentials_are_required_without_connection_string() {
        let err = FileStorageConfig::from_lookup(lookup(&[
            (BUCKET_VAR, "uploads"),
            (ENDPOINT_VAR, "localhost:9000"),
            (ACCESS_KEY_VAR, "ak"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::MissingVariable(SECRET_KEY_VAR.to_string()));
    }

    #[test]
    fn discrete_credentials() {
        let config = FileStorageConfig::from_lookup(lookup(&[
            (BUCKET_VAR, "media"),
            (ENDPOINT_VAR, "store.example.com"),
            (ACCESS_KEY_VAR, "ak"),
            (SECRET_KEY_VAR, "sk"),
            (IS_SECURE_VAR, "True"),
            (NAMING_VAR, "unique-folder-names"),
            (BACKEND_VAR, "memory"),
            (TIMEOUT_SECS_VAR, "30"),
        ]))
        .unwrap();

        assert_eq!(
            config.credentials,
            StorageCredentials::Discrete {
                endpoint: "store.example.com".to_string(),
                access_key: "ak".to_string(),
                secret_key: "sk".to_string(),
                secure: true,
            }
        );
        assert_eq!(config.naming, NamingPolicy::UniqueFolderNames);
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.operation_timeout_secs, Some(30));
    }

    #[test]
    fn bucket_is_required() {
        let err = FileStorageConfig::from_lookup(lookup(&[(
            CONNECTION_STRING_VAR,
            "endpoint=h;accessKey=ak;secretKey=sk",
        )]))
        .unwrap_err();

        assert_eq!(err, ConfigError::MissingVariable(BUCKET_VAR.to_string()));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let err = FileStorageConfig::from_lookup(lookup(&[
            (BUCKET_VAR, "uploads"),
            (CONNECTION_STRING_VAR, "  "),
            (ENDPOINT_VAR, ""),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::MissingVariable(ENDPOINT_VAR.to_string()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = [
            (BUCKET_VAR, "uploads"),
            (CONNECTION_STRING_VAR, "endpoint=h;accessKey=ak;secretKey=sk"),
        ];

        let mut vars = base.to_vec();
        vars.push((NAMING_VAR, "flat"));
        assert!(matches!(
            FileStorageConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut vars = base.to_vec();
        vars.push((TIMEOUT_SECS_VAR, "soon"));
        assert!(matches!(
            FileStorageConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let credentials = StorageCredentials::Discrete {
            endpoint: "h".to_string(),
            access_key: "ak".to_string(),
            secret_key: "super-secret".to_string(),
            secure: false,
        };
        assert!(!format!("{:?}", credentials).contains("super-secret"));

        let credentials =
            StorageCredentials::ConnectionString("secretKey=super-secret".to_string());
        assert!(!format!("{:?}", credentials).contains("super-secret"));
    }
}
