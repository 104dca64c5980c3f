//! Metadata Client Abstraction
//!
//! Image records live in an external metadata service. This module defines
//! the contract the vault calls into, with a remote HTTP implementation and
//! an in-memory one for tests.

pub mod config;
pub mod http_client;
pub mod mock_store;

#[cfg(test)]
mod comprehensive_test;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::media::{ImageMediaType, MediaTypeError};

/// Metadata client error
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A record for this fingerprint already exists
    #[error("record already exists for {0}")]
    AlreadyExists(String),

    /// The identity token was rejected
    #[error("identity rejected by metadata service")]
    Unauthorized,

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Metadata record for one stored image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub id: String,
    #[serde(alias = "fileName")]
    pub fingerprint: Fingerprint,
    /// File extension / image subtype
    pub suffix: String,
    /// Storage path reported at creation
    pub uri: String,
    #[serde(default)]
    pub size_bytes: u64,
    /// Free-form fields, the only part of a record that can be updated
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MetadataRecord {
    pub fn media_type(&self) -> Result<ImageMediaType, MediaTypeError> {
        ImageMediaType::from_subtype(&self.suffix)
    }
}

/// Body of a record creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewImageRecord {
    pub fingerprint: Fingerprint,
    pub suffix: String,
    pub uri: String,
    pub size_bytes: u64,
}

/// Metadata-only update of an existing record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdate {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

/// Wire wrapper for record listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageList {
    #[serde(default)]
    pub images: Vec<MetadataRecord>,
}

/// Trait defining the metadata service interface.
/// Every call carries the caller's identity token.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Look up the record for a fingerprint and suffix
    async fn find_by_fingerprint(
        &self,
        identity: &str,
        fingerprint: &Fingerprint,
        suffix: &str,
    ) -> Result<Option<MetadataRecord>, MetadataError>;

    /// Create a record; `AlreadyExists` if one is already registered
    async fn create(&self, identity: &str, record: &NewImageRecord) -> Result<MetadataRecord, MetadataError>;

    /// Delete a record. Returns `false` if it did not exist
    async fn delete(&self, identity: &str, record_id: &str) -> Result<bool, MetadataError>;

    async fn get(&self, identity: &str, record_id: &str) -> Result<Option<MetadataRecord>, MetadataError>;

    async fn update(&self, identity: &str, update: &ImageUpdate) -> Result<MetadataRecord, MetadataError>;

    async fn list(&self, identity: &str) -> Result<Vec<MetadataRecord>, MetadataError>;

    /// Number of records the service manages for this identity
    async fn count(&self, identity: &str) -> Result<u64, MetadataError>;
}
