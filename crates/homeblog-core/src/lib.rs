//! Homeblog Core Library
//!
//! This crate provides the domain types, error types and configuration shared by the
//! storage subsystem and the binaries that host it.

pub mod config;
pub mod error;
pub mod media;
pub mod storage_types;

// Re-export commonly used types
pub use config::{FileStorageConfig, StorageCredentials};
pub use error::ConfigError;
pub use media::{InvalidMediaId, Media, MediaId};
pub use storage_types::{NamingPolicy, StorageBackend};
