//! Error types module
//!
//! Configuration failures are fatal at startup: they are surfaced to the caller as soon as
//! a configuration is built and are never retried.

/// Malformed or incomplete storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required field is missing or blank (connection string key or constructor argument)
    #[error("Storage configuration must contain '{0}'")]
    MissingField(&'static str),

    /// A required environment variable is not set
    #[error("Environment variable {0} must be set")]
    MissingVariable(String),

    /// A variable is set but its value cannot be used
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }
}
