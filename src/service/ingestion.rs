//! Batch image ingestion.
//!
//! A batch is type checked, bound to the caller's namespace, then processed
//! item by item in input order. Each item is either matched to an existing
//! record or written and registered. If any item fails, every record this
//! batch created is deleted again before the error is returned; blob files
//! stay behind and are healed as orphans on a later upload.

use bytes::Bytes;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::IngestError;
use crate::fingerprint::Fingerprint;
use crate::media::ImageMediaType;
use crate::metadata::{MetadataClient, MetadataError, MetadataRecord, NewImageRecord};
use crate::namespace::{PathResolver, StorageNamespace};
use crate::storage::BlobStore;

/// One uploaded file with its declared media type.
#[derive(Debug, Clone)]
pub struct IngestItem {
    pub bytes: Bytes,
    pub media_type: String,
}

impl IngestItem {
    pub fn new(bytes: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }
}

/// Outcome for one item of a batch. Only `Created` is undone on rollback.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredItem {
    Existing(MetadataRecord),
    Created(MetadataRecord),
}

impl StoredItem {
    pub fn record(&self) -> &MetadataRecord {
        match self {
            StoredItem::Existing(record) | StoredItem::Created(record) => record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchReceipt {
    pub accepted: usize,
    pub created: usize,
    pub reused: usize,
}

impl BatchReceipt {
    fn from_items(items: &[StoredItem]) -> Self {
        let created = items
            .iter()
            .filter(|item| matches!(item, StoredItem::Created(_)))
            .count();
        Self {
            accepted: items.len(),
            created,
            reused: items.len() - created,
        }
    }
}

/// Cooperative cancellation, checked between items.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// MDC keys of one batch. The MDC is thread-local and other batches may run
/// on this thread while one is suspended, so `apply` is called again after
/// every await that precedes a log line.
struct BatchTag {
    owner: String,
    batch: String,
}

impl BatchTag {
    fn new(owner: &str, batch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            batch: batch.to_string(),
        }
    }

    fn apply(&self) {
        log_mdc::insert("owner", self.owner.as_str());
        log_mdc::insert("batch", self.batch.as_str());
    }
}

#[derive(Clone)]
pub struct IngestionCoordinator {
    resolver: PathResolver,
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataClient>,
}

impl IngestionCoordinator {
    pub fn new(resolver: PathResolver, blobs: Arc<dyn BlobStore>, metadata: Arc<dyn MetadataClient>) -> Self {
        Self {
            resolver,
            blobs,
            metadata,
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub async fn ingest(&self, identity: &str, items: Vec<IngestItem>) -> Result<BatchReceipt, IngestError> {
        self.ingest_with_abort(identity, items, &AbortSignal::new()).await
    }

    /// Ingest a batch, stopping before the next item once `abort` is raised.
    /// An aborted batch is compensated exactly like a failed one.
    pub async fn ingest_with_abort(
        &self,
        identity: &str,
        items: Vec<IngestItem>,
        abort: &AbortSignal,
    ) -> Result<BatchReceipt, IngestError> {
        let media_types = check_media_types(&items)?;

        let namespace = self.resolver.resolve_namespace(identity).await?;
        self.blobs.ensure_namespace(&namespace).map_err(|e| {
            error!("Cannot prepare namespace {}: {}", namespace.root().display(), e);
            IngestError::StorageLocationUnavailable(e.to_string())
        })?;

        let batch_id = Fingerprint::of(&items[0].bytes).short().to_string();
        let tag = BatchTag::new(namespace.owner(), &batch_id);
        tag.apply();
        info!("Ingesting batch of {} image(s)", items.len());

        let mut stored: Vec<StoredItem> = Vec::with_capacity(items.len());
        for (index, (item, media_type)) in items.iter().zip(media_types).enumerate() {
            if abort.is_aborted() {
                warn!("Batch aborted before item {}", index);
                let discarded = stored.len();
                self.compensate(identity, &stored, &tag).await;
                return Err(IngestError::Aborted { discarded });
            }

            let outcome = self.store_item(identity, &namespace, &item.bytes, media_type, &tag).await;
            tag.apply();
            match outcome {
                Ok(outcome) => stored.push(outcome),
                Err(e) => {
                    error!("Item {} failed: {}", index, e);
                    let discarded = stored.len();
                    self.compensate(identity, &stored, &tag).await;
                    return Err(IngestError::IngestionFailed {
                        discarded,
                        source: Box::new(e),
                    });
                }
            }
        }

        let receipt = BatchReceipt::from_items(&stored);
        info!(
            "Batch committed: {} accepted, {} created, {} reused",
            receipt.accepted, receipt.created, receipt.reused
        );
        Ok(receipt)
    }

    async fn store_item(
        &self,
        identity: &str,
        namespace: &StorageNamespace,
        bytes: &[u8],
        media_type: ImageMediaType,
        tag: &BatchTag,
    ) -> Result<StoredItem, IngestError> {
        let fingerprint = Fingerprint::of(bytes);
        let path = self.resolver.resolve_path(namespace, &fingerprint, media_type);
        let suffix = media_type.extension();

        // At most one orphan removal; a file that reappears afterwards
        // belongs to a concurrent writer and is safely overwritten. So is an
        // orphan that cannot be removed.
        for pass in 0..2 {
            if !self.blobs.exists(&path) {
                break;
            }
            let found = self.lookup(identity, &fingerprint, suffix).await;
            tag.apply();
            match found? {
                Some(record) => {
                    debug!("Reusing {} for {}", record.id, fingerprint.short());
                    return Ok(StoredItem::Existing(record));
                }
                None if pass == 0 => {
                    warn!("Removing orphaned blob {}", path.display());
                    if let Err(e) = self.blobs.delete(&path) {
                        warn!("Orphan {} not removed, overwriting it: {}", path.display(), e);
                        break;
                    }
                }
                None => {
                    debug!("Blob {} reappeared without a record", path.display());
                }
            }
        }

        self.blobs.write(&path, bytes).map_err(IngestError::WriteFailed)?;

        let request = NewImageRecord {
            fingerprint: fingerprint.clone(),
            suffix: suffix.to_string(),
            uri: path.to_string_lossy().into_owned(),
            size_bytes: bytes.len() as u64,
        };
        let created = self.metadata.create(identity, &request).await;
        tag.apply();
        match created {
            Ok(record) => {
                debug!("Created {} for {}", record.id, fingerprint.short());
                Ok(StoredItem::Created(record))
            }
            Err(MetadataError::AlreadyExists(existing)) => {
                debug!("Record for {} created concurrently", existing);
                let found = self.lookup(identity, &fingerprint, suffix).await;
                tag.apply();
                match found? {
                    Some(record) => Ok(StoredItem::Existing(record)),
                    None => Err(IngestError::MetadataCreateFailed(MetadataError::AlreadyExists(existing))),
                }
            }
            Err(e) => Err(IngestError::MetadataCreateFailed(e)),
        }
    }

    async fn lookup(
        &self,
        identity: &str,
        fingerprint: &Fingerprint,
        suffix: &str,
    ) -> Result<Option<MetadataRecord>, IngestError> {
        self.metadata
            .find_by_fingerprint(identity, fingerprint, suffix)
            .await
            .map_err(IngestError::MetadataUnavailable)
    }

    /// Delete the records this batch created, newest first, and return how
    /// many were actually removed. Failures are logged and never replace the
    /// error that triggered the rollback.
    async fn compensate(&self, identity: &str, stored: &[StoredItem], tag: &BatchTag) -> usize {
        let mut removed = 0;
        for item in stored.iter().rev() {
            if let StoredItem::Created(record) = item {
                let outcome = self.metadata.delete(identity, &record.id).await;
                tag.apply();
                match outcome {
                    Ok(true) => removed += 1,
                    Ok(false) => debug!("Record {} was already gone", record.id),
                    Err(e) => error!("Compensation could not delete record {}: {}", record.id, e),
                }
            }
        }
        warn!("Batch rolled back: {} record(s) removed", removed);
        removed
    }
}

/// Every declared type must be an accepted image type before anything runs.
fn check_media_types(items: &[IngestItem]) -> Result<Vec<ImageMediaType>, IngestError> {
    if items.is_empty() {
        return Err(IngestError::EmptyBatch);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.media_type
                .parse::<ImageMediaType>()
                .map_err(|e| {
                    warn!("Rejecting batch: item {}: {}", index, e);
                    IngestError::UnsupportedMediaType {
                        index,
                        media_type: item.media_type.clone(),
                    }
                })
        })
        .collect()
}
