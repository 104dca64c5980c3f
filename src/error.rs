//! Error taxonomy for ingestion and the single-image operations.
//!
//! `IngestError` is what the service layer returns; it implements
//! `ResponseError` so handlers can propagate it with `?`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::metadata::MetadataError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("missing identity token")]
    MissingIdentity,

    #[error("item {index} has media type '{media_type}'; only image types are allowed")]
    UnsupportedMediaType { index: usize, media_type: String },

    #[error("no images in upload")]
    EmptyBatch,

    #[error("invalid upload payload: {0}")]
    InvalidPayload(String),

    #[error("upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("cannot find a location to store images: {0}")]
    StorageLocationUnavailable(String),

    #[error("failed to write image: {0}")]
    WriteFailed(#[source] StorageError),

    #[error("storage error: {0}")]
    StorageFailed(#[source] StorageError),

    #[error("failed to create image record: {0}")]
    MetadataCreateFailed(#[source] MetadataError),

    #[error("metadata service unavailable: {0}")]
    MetadataUnavailable(#[source] MetadataError),

    #[error("image upload failed, {discarded} completed image(s) discarded: {source}")]
    IngestionFailed {
        discarded: usize,
        #[source]
        source: Box<IngestError>,
    },

    #[error("image upload aborted, {discarded} completed image(s) discarded")]
    Aborted { discarded: usize },

    #[error("not found: {0}")]
    NotFound(String),
}

impl IngestError {
    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::MissingIdentity => "missing_identity",
            IngestError::UnsupportedMediaType { .. } => "unsupported_media_type",
            IngestError::EmptyBatch => "empty_batch",
            IngestError::InvalidPayload(_) => "invalid_payload",
            IngestError::PayloadTooLarge { .. } => "payload_too_large",
            IngestError::StorageLocationUnavailable(_) => "storage_location_unavailable",
            IngestError::WriteFailed(_) => "write_failed",
            IngestError::StorageFailed(_) => "storage_failed",
            IngestError::MetadataCreateFailed(_) => "metadata_create_failed",
            IngestError::MetadataUnavailable(_) => "metadata_unavailable",
            IngestError::IngestionFailed { .. } => "ingestion_failed",
            IngestError::Aborted { .. } => "ingestion_aborted",
            IngestError::NotFound(_) => "not_found",
        }
    }

    /// Items completed then discarded by compensation, for batch failures.
    pub fn discarded(&self) -> Option<usize> {
        match self {
            IngestError::IngestionFailed { discarded, .. } | IngestError::Aborted { discarded } => {
                Some(*discarded)
            }
            _ => None,
        }
    }
}

impl ResponseError for IngestError {
    fn status_code(&self) -> StatusCode {
        match self {
            IngestError::MissingIdentity => StatusCode::UNAUTHORIZED,
            IngestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IngestError::EmptyBatch | IngestError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::StorageLocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            IngestError::MetadataUnavailable(MetadataError::Unauthorized) => StatusCode::UNAUTHORIZED,
            IngestError::MetadataUnavailable(_) => StatusCode::BAD_GATEWAY,
            IngestError::NotFound(_) => StatusCode::NOT_FOUND,
            IngestError::WriteFailed(_)
            | IngestError::StorageFailed(_)
            | IngestError::MetadataCreateFailed(_)
            | IngestError::IngestionFailed { .. }
            | IngestError::Aborted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let Some(discarded) = self.discarded() {
            body["discarded"] = json!(discarded);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
