//! Storage provider
//!
//! Holds the long-lived configuration and client and opens sessions. It has no mutable
//! state, so one instance can serve the whole process.

use std::fmt;
use std::sync::Arc;

use homeblog_core::{Media, StorageBackend};

use crate::client::ObjectStoreClient;
use crate::config::ProviderConfig;
use crate::keys::generate_storage_key;
use crate::session::StorageSession;
use crate::traits::{Session, Storage};

/// [`Storage`] implementation over any [`ObjectStoreClient`]
#[derive(Clone)]
pub struct StorageProvider {
    config: ProviderConfig,
    client: Arc<dyn ObjectStoreClient>,
    backend: StorageBackend,
}

impl StorageProvider {
    pub fn new(
        config: ProviderConfig,
        client: Arc<dyn ObjectStoreClient>,
        backend: StorageBackend,
    ) -> Self {
        StorageProvider {
            config,
            client,
            backend,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Open a session without boxing it.
    pub fn session(&self) -> StorageSession {
        StorageSession::new(
            Arc::clone(&self.client),
            self.config.bucket(),
            self.config.naming(),
        )
    }
}

impl Storage for StorageProvider {
    fn open_session(&self) -> Box<dyn Session> {
        Box::new(self.session())
    }

    fn public_url(&self, media: &Media, filename: &str) -> Option<String> {
        if filename.trim().is_empty() {
            return None;
        }

        Some(format!(
            "{}/{}/{}",
            self.config.endpoint_url(),
            self.config.bucket(),
            self.resource_name(media, filename)
        ))
    }

    fn resource_name(&self, media: &Media, filename: &str) -> String {
        generate_storage_key(&media.id, filename, self.config.naming())
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}

impl fmt::Debug for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageProvider")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
