//! Mock blob storage implementation for testing

use crate::namespace::StorageNamespace;
use crate::storage::{BlobStore, NamespaceUsage, StorageError};
use log::info;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// A mock blob store that keeps blobs in memory.
/// Writes can be made to fail to exercise rollback paths.
pub struct MockBlobStore {
    /// In-memory storage: path -> blob bytes
    blobs: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    namespaces: Arc<Mutex<HashSet<PathBuf>>>,
    state: Arc<Mutex<FaultState>>,
}

#[derive(Default)]
struct FaultState {
    writes_attempted: usize,
    /// 1-based index of the write attempt that fails
    fail_write_at: Option<usize>,
    fail_all_writes: bool,
    fail_namespaces: bool,
    fail_deletes: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            namespaces: Arc::new(Mutex::new(HashSet::new())),
            state: Arc::new(Mutex::new(FaultState::default())),
        }
    }

    /// Fail the `n`th write attempt (1-based) from now on
    pub fn fail_write_at(&self, n: usize) {
        let mut state = lock(&self.state);
        state.fail_write_at = Some(state.writes_attempted + n);
    }

    pub fn set_fail_all_writes(&self, fail: bool) {
        lock(&self.state).fail_all_writes = fail;
    }

    pub fn set_fail_namespaces(&self, fail: bool) {
        lock(&self.state).fail_namespaces = fail;
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        lock(&self.state).fail_deletes = fail;
    }

    /// Place a blob without going through `write` (e.g. a leftover orphan)
    pub fn insert_raw(&self, path: impl Into<PathBuf>, data: &[u8]) {
        lock(&self.blobs).insert(path.into(), data.to_vec());
    }

    pub fn write_count(&self) -> usize {
        lock(&self.state).writes_attempted
    }

    pub fn blob_count(&self) -> usize {
        lock(&self.blobs).len()
    }

    pub fn contains(&self, path: &Path) -> bool {
        lock(&self.blobs).contains_key(path)
    }

    /// Clear all stored data (useful for testing)
    pub fn clear(&self) {
        lock(&self.blobs).clear();
        lock(&self.namespaces).clear();
        *lock(&self.state) = FaultState::default();
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MockBlobStore {
    fn ensure_namespace(&self, namespace: &StorageNamespace) -> Result<(), StorageError> {
        if lock(&self.state).fail_namespaces {
            return Err(StorageError::Namespace {
                path: namespace.root().to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "mock: permission denied"),
            });
        }
        lock(&self.namespaces).insert(namespace.root().to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        lock(&self.blobs).contains_key(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        {
            let mut state = lock(&self.state);
            state.writes_attempted += 1;
            let attempt = state.writes_attempted;
            if state.fail_all_writes || state.fail_write_at == Some(attempt) {
                info!("Mock: failing write #{} to {}", attempt, path.display());
                return Err(StorageError::Write {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::Other, "mock: no space left on device"),
                });
            }
        }

        lock(&self.blobs).insert(path.to_path_buf(), data.to_vec());
        info!("Mock: stored {} bytes at {}", data.len(), path.display());
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        lock(&self.blobs)
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_path_buf()))
    }

    fn delete(&self, path: &Path) -> Result<bool, StorageError> {
        if lock(&self.state).fail_deletes {
            return Err(StorageError::Delete {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "mock: permission denied"),
            });
        }
        Ok(lock(&self.blobs).remove(path).is_some())
    }

    fn usage(&self, namespace: &StorageNamespace) -> Result<NamespaceUsage, StorageError> {
        let blobs = lock(&self.blobs);
        let mut usage = NamespaceUsage::default();
        for (path, data) in blobs.iter() {
            if path.parent() == Some(namespace.root()) {
                usage.files += 1;
                usage.bytes += data.len() as u64;
            }
        }
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::mock_store::MockMetadataClient;
    use crate::namespace::PathResolver;

    fn namespace(owner: &str) -> StorageNamespace {
        PathResolver::new("/mock", Arc::new(MockMetadataClient::new()))
            .namespace_for_owner(owner)
            .unwrap()
    }

    #[test]
    fn test_mock_blob_store_basic_operations() {
        let store = MockBlobStore::new();
        let path = PathBuf::from("/mock/alice/a.png");

        store.write(&path, b"image").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), b"image");
        assert!(store.delete(&path).unwrap());
        assert!(!store.delete(&path).unwrap());
        assert!(matches!(store.read(&path), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_fail_write_at_counts_from_now() {
        let store = MockBlobStore::new();
        store.write(Path::new("/mock/a/1.png"), b"1").unwrap();

        store.fail_write_at(2);
        store.write(Path::new("/mock/a/2.png"), b"2").unwrap();
        assert!(store.write(Path::new("/mock/a/3.png"), b"3").is_err());
        assert!(!store.contains(Path::new("/mock/a/3.png")));
        store.write(Path::new("/mock/a/4.png"), b"4").unwrap();
        assert_eq!(store.write_count(), 4);
    }

    #[test]
    fn test_usage_is_scoped_to_namespace() {
        let store = MockBlobStore::new();
        store.insert_raw("/mock/alice/a.png", b"1234");
        store.insert_raw("/mock/alice/b.gif", b"56");
        store.insert_raw("/mock/bob/c.png", b"789");

        assert_eq!(
            store.usage(&namespace("alice")).unwrap(),
            NamespaceUsage { files: 2, bytes: 6 }
        );
        assert_eq!(store.usage(&namespace("bob")).unwrap().files, 1);
    }

    #[test]
    fn test_mock_blob_store_clear() {
        let store = MockBlobStore::new();
        store.insert_raw("/mock/alice/a.png", b"1");
        store.set_fail_all_writes(true);
        store.clear();
        assert_eq!(store.blob_count(), 0);
        store.write(Path::new("/mock/alice/b.png"), b"2").unwrap();
    }
}
