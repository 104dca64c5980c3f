//! Blob Storage Layer Abstraction
//!
//! This module provides an abstraction over blob storage backends so the
//! ingestion pipeline can run against the local filesystem or an in-memory
//! store without changing higher-level services.

pub mod config;
pub mod local_store;
pub mod mock_store;


use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::namespace::StorageNamespace;

/// Error type for blob storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to prepare storage directory {}: {source}", path.display())]
    Namespace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("blob not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// File count and total size of one namespace directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceUsage {
    pub files: u64,
    pub bytes: u64,
}

/// Trait defining the blob storage interface
pub trait BlobStore: Send + Sync {
    /// Make sure the namespace directory exists before anything is written into it
    fn ensure_namespace(&self, namespace: &StorageNamespace) -> Result<(), StorageError>;

    /// Check whether a blob is present at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Write `data` to `path` atomically: afterwards either all of `data` is
    /// at `path` or the previous state is untouched
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StorageError>;

    /// Read a whole blob
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Delete a blob. Returns `false` if nothing was there.
    fn delete(&self, path: &Path) -> Result<bool, StorageError>;

    /// Count the files and bytes stored in a namespace
    fn usage(&self, namespace: &StorageNamespace) -> Result<NamespaceUsage, StorageError>;
}
