//! Single-image operations on top of the blob store and metadata service

use log::{debug, info, warn};
use std::sync::Arc;

use crate::error::IngestError;
use crate::media::ImageMediaType;
use crate::metadata::{ImageUpdate, MetadataClient, MetadataRecord};
use crate::namespace::{PathResolver, StorageNamespace};
use crate::storage::{BlobStore, NamespaceUsage, StorageError};

/// Image content with the type it is served as
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContent {
    pub media_type: ImageMediaType,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct ImageService {
    resolver: PathResolver,
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataClient>,
}

impl ImageService {
    pub fn new(resolver: PathResolver, blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataClient>) -> Self {
        Self {
            resolver,
            blobs,
            metadata,
        }
    }

    pub async fn get_image(&self, identity: &str, id: &str) -> Result<MetadataRecord, IngestError> {
        self.metadata
            .get(identity, id)
            .await
            .map_err(IngestError::MetadataUnavailable)?
            .ok_or_else(|| IngestError::NotFound(format!("image {}", id)))
    }

    pub async fn update_image(&self, identity: &str, update: &ImageUpdate) -> Result<MetadataRecord, IngestError> {
        // surface a missing record as 404 rather than a service error
        self.get_image(identity, &update.id).await?;
        debug!("Updating properties of image {}", update.id);
        self.metadata
            .update(identity, update)
            .await
            .map_err(IngestError::MetadataUnavailable)
    }

    /// Delete the record, then its blob. Deleting an unknown id succeeds
    /// and returns `false`.
    pub async fn delete_image(&self, identity: &str, id: &str) -> Result<bool, IngestError> {
        let record = match self
            .metadata
            .get(identity, id)
            .await
            .map_err(IngestError::MetadataUnavailable)?
        {
            Some(record) => record,
            None => {
                debug!("Delete of unknown image {} ignored", id);
                return Ok(false);
            }
        };

        // resolved first so a failure leaves both record and blob in place
        let namespace = self.resolver.resolve_namespace(identity).await?;
        let removed = self
            .metadata
            .delete(identity, id)
            .await
            .map_err(IngestError::MetadataUnavailable)?;

        match record.media_type() {
            Ok(media_type) => {
                let path = self.resolver.resolve_path(&namespace, &record.fingerprint, media_type);
                if let Err(e) = self.blobs.delete(&path) {
                    warn!("Record {} deleted but blob {} remains: {}", id, path.display(), e);
                }
            }
            Err(e) => warn!("Record {} has unusable suffix, blob left in place: {}", id, e),
        }

        info!("Deleted image {}", id);
        Ok(removed)
    }

    pub async fn list_images(&self, identity: &str) -> Result<Vec<MetadataRecord>, IngestError> {
        self.metadata
            .list(identity)
            .await
            .map_err(IngestError::MetadataUnavailable)
    }

    /// Records the metadata service holds for this identity
    pub async fn managed_count(&self, identity: &str) -> Result<u64, IngestError> {
        self.metadata
            .count(identity)
            .await
            .map_err(IngestError::MetadataUnavailable)
    }

    /// Files present in the identity's namespace directory
    pub async fn stored_count(&self, identity: &str) -> Result<u64, IngestError> {
        Ok(self.usage(identity).await?.files)
    }

    pub async fn stored_size(&self, identity: &str) -> Result<u64, IngestError> {
        Ok(self.usage(identity).await?.bytes)
    }

    /// Read an image's bytes. The path is derived from the record's
    /// fingerprint and suffix; the stored `uri` is never followed.
    pub async fn read_content(&self, identity: &str, id: &str) -> Result<ImageContent, IngestError> {
        let record = self.get_image(identity, id).await?;
        let media_type = record
            .media_type()
            .map_err(|e| IngestError::NotFound(format!("image {}: {}", id, e)))?;

        let namespace = self.resolver.resolve_namespace(identity).await?;
        let path = self.resolver.resolve_path(&namespace, &record.fingerprint, media_type);
        let data = self.blobs.read(&path).map_err(|e| match e {
            StorageError::NotFound(_) => IngestError::NotFound(format!("content of image {}", id)),
            other => IngestError::StorageFailed(other),
        })?;

        Ok(ImageContent { media_type, data })
    }

    async fn usage(&self, identity: &str) -> Result<NamespaceUsage, IngestError> {
        let namespace: StorageNamespace = self.resolver.resolve_namespace(identity).await?;
        self.blobs.usage(&namespace).map_err(IngestError::StorageFailed)
    }
}
