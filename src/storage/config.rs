//! Configuration for blob storage backends

use crate::storage::{local_store::LocalBlobStore, mock_store::MockBlobStore, BlobStore, StorageError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::Arc;

/// Available blob storage backends
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum StorageBackend {
    #[default]
    LocalFs,
    Mock,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "localfs" | "local" | "fs" => Ok(StorageBackend::LocalFs),
            "mock" => Ok(StorageBackend::Mock),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

impl StorageBackend {
    /// Environment override, falling back to `configured`
    pub fn from_env_or(configured: StorageBackend) -> Self {
        match env::var("STORAGE_BACKEND") {
            Ok(backend_str) => match backend_str.parse::<StorageBackend>() {
                Ok(backend) => {
                    info!("Using storage backend from environment: {:?}", backend);
                    backend
                }
                Err(e) => {
                    warn!("Invalid storage backend in environment: {}. Using {:?}.", e, configured);
                    configured
                }
            },
            Err(_) => configured,
        }
    }

    /// Create a blob store instance for this backend
    pub fn create_store(&self, temp_path: &Path) -> Result<Arc<dyn BlobStore>, StorageError> {
        match self {
            StorageBackend::LocalFs => {
                info!("Creating local filesystem blob store");
                Ok(Arc::new(LocalBlobStore::new(temp_path)?))
            }
            StorageBackend::Mock => {
                info!("Creating mock blob store");
                Ok(Arc::new(MockBlobStore::new()))
            }
        }
    }
}
