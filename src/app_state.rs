//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::metadata::config::{MetadataBackend, MetadataServices};
use crate::metadata::mock_store::MockMetadataClient;
use crate::metadata::{MetadataClient, MetadataError};
use crate::namespace::{IdentityResolver, PathResolver};
use crate::service::image_service::ImageService;
use crate::service::ingestion::IngestionCoordinator;
use crate::storage::mock_store::MockBlobStore;
use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("storage setup failed: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata client setup failed: {0}")]
    Metadata(#[from] MetadataError),
}

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionCoordinator>,
    pub images: Arc<ImageService>,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        info!("Initializing application state with configuration");
        info!(
            "Storage backend {:?} with base_path: {}, temp_path: {}",
            config.storage.backend,
            config.storage.base_path.display(),
            config.storage.temp_path.display()
        );
        let blobs = config.storage.backend.create_store(&config.storage.temp_path)?;

        let MetadataServices { client, resolver } = config.metadata.backend.create(&config.metadata)?;
        if config.metadata.backend == MetadataBackend::Mock {
            info!("Mock metadata backend knows no identities; every upload will be refused");
        }

        let state = Self::assemble(config, blobs, client, resolver);
        info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire services around explicit collaborators
    pub fn assemble(
        config: AppConfig,
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataClient>,
        identities: Arc<dyn IdentityResolver>,
    ) -> Self {
        let resolver = PathResolver::new(config.storage.base_path.clone(), identities);
        let ingestion = Arc::new(IngestionCoordinator::new(resolver.clone(), blobs.clone(), metadata.clone()));
        let images = Arc::new(ImageService::new(resolver, blobs, metadata));
        Self {
            ingestion,
            images,
            config,
        }
    }

    /// Create application state for testing with mock backends
    pub fn new_for_testing() -> (Self, Arc<MockBlobStore>, Arc<MockMetadataClient>) {
        let mut config = AppConfig::default();
        config.storage.base_path = "/vault".into();
        let blobs = Arc::new(MockBlobStore::new());
        let metadata = Arc::new(MockMetadataClient::new());
        let state = Self::assemble(config, blobs.clone(), metadata.clone(), metadata.clone());
        (state, blobs, metadata)
    }
}
