//! Homeblog Storage Library
//!
//! This crate persists and serves uploaded media through an S3-compatible object store.
//! A [`StorageProvider`] holds the long-lived configuration and opens short-lived
//! [`StorageSession`]s that upload, download and delete objects.
//!
//! # Object key format
//!
//! Keys are derived from the media id and filename, never stored:
//!
//! - **Unique file names**: `{media_id}-{filename}`
//! - **Unique folder names**: `{media_id}/{filename}`
//!
//! Public URLs are path-style: `{http|https}://{endpoint}/{bucket}/{key}`. Buckets are
//! created on first upload with a policy granting anonymous read on every object.

pub mod client;
pub mod config;
pub mod connection;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod policy;
pub mod provider;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod session;
pub mod traits;

// Re-export commonly used types
pub use client::{ClientError, ObjectStoreClient, ObjectStream, PutPayload};
pub use config::ProviderConfig;
pub use connection::ConnectionParams;
pub use factory::create_storage;
#[cfg(feature = "storage-s3")]
pub use factory::{connect, connect_with_connection_string};
pub use homeblog_core::{ConfigError, Media, MediaId, NamingPolicy, StorageBackend};
#[cfg(feature = "storage-memory")]
pub use memory::InMemoryClient;
pub use provider::StorageProvider;
#[cfg(feature = "storage-s3")]
pub use s3::S3Client;
pub use session::StorageSession;
pub use traits::{Operation, Session, Storage, StorageError, StorageResult};
