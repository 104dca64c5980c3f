//! Local filesystem blob storage implementation

use crate::namespace::StorageNamespace;
use crate::storage::{BlobStore, NamespaceUsage, StorageError};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

const STAGING_PREFIX: &str = ".ingest-";

fn write_error(path: &Path) -> impl Fn(io::Error) -> StorageError + '_ {
    move |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// Blob store writing one file per blob.
///
/// Writes land in a scoped temporary file under `temp_path` first and are
/// renamed onto the target once complete and synced. The temporary file is
/// removed on every early return by `NamedTempFile`'s drop.
pub struct LocalBlobStore {
    temp_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(temp_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let temp_path = temp_path.into();
        fs::create_dir_all(&temp_path).map_err(|source| StorageError::Namespace {
            path: temp_path.clone(),
            source,
        })?;
        info!("Using staging directory: {}", temp_path.display());
        Ok(Self { temp_path })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Stream `reader` into `path`. Returns the number of bytes written.
    pub fn write_from_reader(&self, path: &Path, reader: &mut dyn Read) -> Result<u64, StorageError> {
        let mut staged = Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&self.temp_path)
            .map_err(write_error(path))?;

        let written = io::copy(reader, staged.as_file_mut()).map_err(write_error(path))?;
        staged.as_file().sync_all().map_err(write_error(path))?;

        self.commit(staged, path)?;
        debug!("Wrote {} bytes to {}", written, path.display());
        Ok(written)
    }

    /// Move a synced staging file onto `path`.
    fn commit(&self, staged: NamedTempFile, path: &Path) -> Result<(), StorageError> {
        match staged.persist(path) {
            Ok(_) => {}
            Err(e) if e.error.raw_os_error() == Some(libc::EXDEV) => {
                // Staging is on another filesystem: copy next to the target, then rename.
                let parent = path.parent().unwrap_or_else(|| Path::new("."));
                let mut source = e.file.reopen().map_err(write_error(path))?;
                let mut sibling = Builder::new()
                    .prefix(STAGING_PREFIX)
                    .tempfile_in(parent)
                    .map_err(write_error(path))?;
                io::copy(&mut source, sibling.as_file_mut()).map_err(write_error(path))?;
                sibling.as_file().sync_all().map_err(write_error(path))?;
                sibling
                    .persist(path)
                    .map_err(|e| write_error(path)(e.error))?;
            }
            Err(e) => return Err(write_error(path)(e.error)),
        }

        if let Some(parent) = path.parent() {
            sync_dir(parent);
        }
        Ok(())
    }
}

fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        warn!("Could not sync directory {}: {}", dir.display(), e);
    }
}

impl BlobStore for LocalBlobStore {
    fn ensure_namespace(&self, namespace: &StorageNamespace) -> Result<(), StorageError> {
        fs::create_dir_all(namespace.root()).map_err(|source| StorageError::Namespace {
            path: namespace.root().to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut reader: &[u8] = data;
        self.write_from_reader(path, &mut reader).map(|_| ())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        fs::read(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            _ => StorageError::Read {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    fn delete(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted blob {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Delete {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn usage(&self, namespace: &StorageNamespace) -> Result<NamespaceUsage, StorageError> {
        let read_error = |source| StorageError::Read {
            path: namespace.root().to_path_buf(),
            source,
        };

        let entries = match fs::read_dir(namespace.root()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NamespaceUsage::default()),
            Err(e) => return Err(read_error(e)),
        };

        let mut usage = NamespaceUsage::default();
        for entry in entries {
            let entry = entry.map_err(read_error)?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let metadata = entry.metadata().map_err(read_error)?;
            if metadata.is_file() {
                usage.files += 1;
                usage.bytes += metadata.len();
            }
        }
        Ok(usage)
    }
}
