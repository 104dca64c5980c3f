//! Comprehensive tests for metadata client implementations

#[cfg(test)]
mod integration_tests {
    use crate::fingerprint::Fingerprint;
    use crate::metadata::config::{MetadataBackend, MetadataSettings};
    use crate::metadata::{ImageUpdate, MetadataClient, MetadataError, NewImageRecord};
    use std::collections::HashMap;

    fn request(data: &[u8], suffix: &str) -> NewImageRecord {
        let fingerprint = Fingerprint::of(data);
        NewImageRecord {
            uri: format!("/images/alice/{}.{}", fingerprint, suffix),
            fingerprint,
            suffix: suffix.to_string(),
            size_bytes: data.len() as u64,
        }
    }

    /// Full record lifecycle through the trait object
    #[tokio::test]
    async fn test_record_lifecycle_through_trait() {
        let services = MetadataBackend::Mock.create(&MetadataSettings::default()).unwrap();
        let client: &dyn MetadataClient = services.client.as_ref();
        let identity = "token-alice";

        let png = client.create(identity, &request(b"pixels", "png")).await.unwrap();
        // same bytes with another suffix is a distinct record
        let gif = client.create(identity, &request(b"pixels", "gif")).await.unwrap();
        assert_ne!(png.id, gif.id);
        assert_eq!(client.count(identity).await.unwrap(), 2);

        let duplicate = client.create(identity, &request(b"pixels", "png")).await;
        assert!(matches!(duplicate, Err(MetadataError::AlreadyExists(_))));

        let mut properties = HashMap::new();
        properties.insert("album".to_string(), "holiday".to_string());
        client
            .update(identity, &ImageUpdate { id: png.id.clone(), properties })
            .await
            .unwrap();

        let listed = client.list(identity).await.unwrap();
        assert_eq!(listed.len(), 2);
        let fetched = client.get(identity, &png.id).await.unwrap().unwrap();
        assert_eq!(fetched.properties["album"], "holiday");
        assert_eq!(fetched.fingerprint, png.fingerprint);

        assert!(client.delete(identity, &png.id).await.unwrap());
        assert!(!client.delete(identity, &png.id).await.unwrap());
        assert!(client.get(identity, &png.id).await.unwrap().is_none());
        assert_eq!(client.count(identity).await.unwrap(), 1);
    }

    /// Records are scoped to the identity that created them
    #[tokio::test]
    async fn test_records_are_identity_scoped() {
        let services = MetadataBackend::Mock.create(&MetadataSettings::default()).unwrap();
        let client = services.client;

        let created = client.create("alice", &request(b"mine", "jpeg")).await.unwrap();
        assert!(client.get("bob", &created.id).await.unwrap().is_none());
        assert!(client.list("bob").await.unwrap().is_empty());
        assert!(!client.delete("bob", &created.id).await.unwrap());
        assert_eq!(client.count("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolver_shares_backend() {
        let services = MetadataBackend::Mock.create(&MetadataSettings::default()).unwrap();
        assert_eq!(services.resolver.resolve_owner("nobody").await.unwrap(), None);
    }
}
