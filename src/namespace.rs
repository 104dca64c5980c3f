//! Storage namespaces and canonical blob paths.
//!
//! Every identity owns one directory under the configured base path. Blob
//! files inside it are named `<fingerprint>.<extension>`; there are no
//! nested directories.

use async_trait::async_trait;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::IngestError;
use crate::fingerprint::Fingerprint;
use crate::media::ImageMediaType;
use crate::metadata::MetadataError;

/// Maps a caller's identity token to the owner that names its namespace.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` for an unknown or expired identity.
    async fn resolve_owner(&self, identity: &str) -> Result<Option<String>, MetadataError>;
}

/// Directory root bound to one identity owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNamespace {
    owner: String,
    root: PathBuf,
}

impl StorageNamespace {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolves namespaces and blob paths from explicit configuration.
#[derive(Clone)]
pub struct PathResolver {
    base_path: PathBuf,
    identities: Arc<dyn IdentityResolver>,
}

impl PathResolver {
    pub fn new(base_path: impl Into<PathBuf>, identities: Arc<dyn IdentityResolver>) -> Self {
        Self {
            base_path: base_path.into(),
            identities,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve the namespace for `identity`. Any failure means the batch
    /// must not write anything.
    pub async fn resolve_namespace(&self, identity: &str) -> Result<StorageNamespace, IngestError> {
        if identity.trim().is_empty() {
            return Err(IngestError::StorageLocationUnavailable("empty identity".to_string()));
        }

        let owner = match self.identities.resolve_owner(identity).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!("No storage owner for the supplied identity");
                return Err(IngestError::StorageLocationUnavailable(
                    "unknown or expired identity".to_string(),
                ));
            }
            Err(e) => {
                warn!("Identity resolution failed: {}", e);
                return Err(IngestError::StorageLocationUnavailable(e.to_string()));
            }
        };

        self.namespace_for_owner(&owner)
    }

    /// Build the namespace for an already resolved owner.
    pub fn namespace_for_owner(&self, owner: &str) -> Result<StorageNamespace, IngestError> {
        if !is_safe_component(owner) {
            warn!("Rejecting owner '{}' as a namespace directory name", owner);
            return Err(IngestError::StorageLocationUnavailable(format!(
                "owner '{}' is not a valid namespace",
                owner
            )));
        }

        let root = self.base_path.join(owner);
        debug!("Resolved namespace for owner {} at {}", owner, root.display());
        Ok(StorageNamespace {
            owner: owner.to_string(),
            root,
        })
    }

    /// Canonical path of a blob. Pure; never touches disk.
    pub fn resolve_path(
        &self,
        namespace: &StorageNamespace,
        fingerprint: &Fingerprint,
        media_type: ImageMediaType,
    ) -> PathBuf {
        namespace
            .root
            .join(format!("{}.{}", fingerprint, media_type.extension()))
    }
}

fn is_safe_component(owner: &str) -> bool {
    !owner.is_empty()
        && owner != "."
        && owner != ".."
        && owner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::mock_store::MockMetadataClient;

    fn resolver() -> (PathResolver, Arc<MockMetadataClient>) {
        let metadata = Arc::new(MockMetadataClient::new());
        metadata.register_identity("token-alice", "alice");
        (PathResolver::new("/srv/images", metadata.clone()), metadata)
    }

    #[tokio::test]
    async fn test_resolve_known_identity() {
        let (resolver, _) = resolver();
        let namespace = resolver.resolve_namespace("token-alice").await.unwrap();
        assert_eq!(namespace.owner(), "alice");
        assert_eq!(namespace.root(), Path::new("/srv/images/alice"));
    }

    #[tokio::test]
    async fn test_unknown_identity_is_unavailable() {
        let (resolver, _) = resolver();
        let result = resolver.resolve_namespace("token-nobody").await;
        assert!(matches!(result, Err(IngestError::StorageLocationUnavailable(_))));

        let result = resolver.resolve_namespace("  ").await;
        assert!(matches!(result, Err(IngestError::StorageLocationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_owner_must_be_single_component() {
        let (resolver, metadata) = resolver();
        metadata.register_identity("token-evil", "../etc");
        let result = resolver.resolve_namespace("token-evil").await;
        assert!(matches!(result, Err(IngestError::StorageLocationUnavailable(_))));

        assert!(resolver.namespace_for_owner("a/b").is_err());
        assert!(resolver.namespace_for_owner("..").is_err());
        assert!(resolver.namespace_for_owner("user_42@shop").is_ok());
    }

    #[tokio::test]
    async fn test_resolver_failure_is_unavailable() {
        let (resolver, metadata) = resolver();
        metadata.set_fail_lookups(true);
        let result = resolver.resolve_namespace("token-alice").await;
        assert!(matches!(result, Err(IngestError::StorageLocationUnavailable(_))));
    }

    #[test]
    fn test_resolve_path_is_fingerprint_dot_extension() {
        let (resolver, _) = resolver();
        let namespace = resolver.namespace_for_owner("alice").unwrap();
        let fp = Fingerprint::of(b"pixels");
        let path = resolver.resolve_path(&namespace, &fp, ImageMediaType::Png);
        assert_eq!(
            path,
            PathBuf::from(format!("/srv/images/alice/{}.png", fp))
        );
        assert_eq!(path, resolver.resolve_path(&namespace, &fp, ImageMediaType::Png));
    }
}
