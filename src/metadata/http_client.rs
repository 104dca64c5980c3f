//! HTTP client for the remote image metadata service

use crate::fingerprint::Fingerprint;
use crate::metadata::config::MetadataSettings;
use crate::metadata::{ImageList, ImageUpdate, MetadataClient, MetadataError, MetadataRecord, NewImageRecord};
use crate::namespace::IdentityResolver;
use async_trait::async_trait;
use log::debug;
use reqwest::{header::HeaderName, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Talks JSON to the metadata service, forwarding the caller's identity
/// token in the configured header on every request.
pub struct HttpMetadataClient {
    client: Client,
    base_url: String,
    auth_header: HeaderName,
}

#[derive(Deserialize)]
struct OwnerResponse {
    id: String,
}

impl HttpMetadataClient {
    pub fn new(settings: &MetadataSettings) -> Result<Self, MetadataError> {
        let auth_header = HeaderName::from_bytes(settings.auth_header.as_bytes())
            .map_err(|e| MetadataError::InvalidResponse(format!("invalid auth header name: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, identity: &str) -> RequestBuilder {
        builder.header(self.auth_header.clone(), identity)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, MetadataError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MetadataError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetadataError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like `read_json`, with 404 mapped to `None`
    async fn read_optional_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>, MetadataError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::read_json(response).await.map(Some)
    }
}

#[async_trait]
impl IdentityResolver for HttpMetadataClient {
    async fn resolve_owner(&self, identity: &str) -> Result<Option<String>, MetadataError> {
        let response = self
            .authed(self.client.get(self.url("/user/token")), identity)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                debug!("Identity rejected with status {}", response.status());
                Ok(None)
            }
            _ => {
                let owner: OwnerResponse = Self::read_json(response).await?;
                Ok(Some(owner.id))
            }
        }
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn find_by_fingerprint(
        &self,
        identity: &str,
        fingerprint: &Fingerprint,
        suffix: &str,
    ) -> Result<Option<MetadataRecord>, MetadataError> {
        let url = self.url(&format!(
            "/image/entity/filename/{}/{}",
            fingerprint,
            urlencoding::encode(suffix)
        ));
        let response = self.authed(self.client.get(url), identity).send().await?;
        Self::read_optional_json(response).await
    }

    async fn create(&self, identity: &str, record: &NewImageRecord) -> Result<MetadataRecord, MetadataError> {
        let response = self
            .authed(self.client.post(self.url("/image/entity")), identity)
            .json(record)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(MetadataError::AlreadyExists(record.fingerprint.to_string()));
        }
        Self::read_json(response).await
    }

    async fn delete(&self, identity: &str, record_id: &str) -> Result<bool, MetadataError> {
        let url = self.url(&format!("/image/entity/{}", urlencoding::encode(record_id)));
        let response = self.authed(self.client.delete(url), identity).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MetadataError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MetadataError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(true)
    }

    async fn get(&self, identity: &str, record_id: &str) -> Result<Option<MetadataRecord>, MetadataError> {
        let url = self.url(&format!("/image/entity/{}", urlencoding::encode(record_id)));
        let response = self.authed(self.client.get(url), identity).send().await?;
        Self::read_optional_json(response).await
    }

    async fn update(&self, identity: &str, update: &ImageUpdate) -> Result<MetadataRecord, MetadataError> {
        let response = self
            .authed(self.client.put(self.url("/image/entity")), identity)
            .json(update)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn list(&self, identity: &str) -> Result<Vec<MetadataRecord>, MetadataError> {
        let response = self
            .authed(self.client.get(self.url("/image/entity")), identity)
            .send()
            .await?;
        let list: ImageList = Self::read_json(response).await?;
        Ok(list.images)
    }

    async fn count(&self, identity: &str) -> Result<u64, MetadataError> {
        let response = self
            .authed(self.client.get(self.url("/image/managedamount")), identity)
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::config::MetadataBackend;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpMetadataClient {
        HttpMetadataClient::new(&MetadataSettings {
            backend: MetadataBackend::Remote,
            base_url: format!("{}/", server.uri()),
            auth_header: "X-Auth-Token".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn record_json(id: &str, fp: &Fingerprint) -> serde_json::Value {
        json!({
            "id": id,
            "fingerprint": fp.as_str(),
            "suffix": "png",
            "uri": format!("/srv/alice/{}.png", fp),
            "sizeBytes": 3,
        })
    }

    #[tokio::test]
    async fn test_resolve_owner_forwards_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/token"))
            .and(header("X-Auth-Token", "token-alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "alice" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/token"))
            .and(header("X-Auth-Token", "expired"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.resolve_owner("token-alice").await.unwrap(), Some("alice".to_string()));
        assert_eq!(client.resolve_owner("expired").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_fingerprint() {
        let server = MockServer::start().await;
        let fp = Fingerprint::of(b"png");
        Mock::given(method("GET"))
            .and(path(format!("/image/entity/filename/{}/png", fp)))
            .respond_with(ResponseTemplate::new(200).set_body_json(record_json("img-7", &fp)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let found = client.find_by_fingerprint("t", &fp, "png").await.unwrap().unwrap();
        assert_eq!(found.id, "img-7");
        assert_eq!(found.size_bytes, 3);

        // unmatched routes answer 404
        let missing = client.find_by_fingerprint("t", &fp, "gif").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_create_maps_conflict_to_already_exists() {
        let server = MockServer::start().await;
        let fp = Fingerprint::of(b"dup");
        Mock::given(method("POST"))
            .and(path("/image/entity"))
            .and(body_partial_json(json!({ "fingerprint": fp.as_str(), "sizeBytes": 3 })))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = NewImageRecord {
            fingerprint: fp.clone(),
            suffix: "png".to_string(),
            uri: "/srv/alice/dup.png".to_string(),
            size_bytes: 3,
        };
        let result = client.create("t", &request).await;
        assert!(matches!(result, Err(MetadataError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_returns_record() {
        let server = MockServer::start().await;
        let fp = Fingerprint::of(b"new");
        Mock::given(method("POST"))
            .and(path("/image/entity"))
            .respond_with(ResponseTemplate::new(201).set_body_json(record_json("img-1", &fp)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let request = NewImageRecord {
            fingerprint: fp.clone(),
            suffix: "png".to_string(),
            uri: "/srv/alice/new.png".to_string(),
            size_bytes: 3,
        };
        let created = client.create("t", &request).await.unwrap();
        assert_eq!(created.id, "img-1");
        assert_eq!(created.fingerprint, fp);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/image/entity/img-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.delete("t", "img-1").await.unwrap());
        assert!(!client.delete("t", "img-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let server = MockServer::start().await;
        let fp = Fingerprint::of(b"listed");
        Mock::given(method("GET"))
            .and(path("/image/entity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images": [record_json("img-3", &fp)] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/image/managedamount"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(12)))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let images = client.list("t").await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "img-3");
        assert_eq!(client.count("t").await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_server_errors_surface() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/image/entity"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/image/entity"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let update = ImageUpdate {
            id: "img-1".to_string(),
            properties: Default::default(),
        };
        match client.update("t", &update).await {
            Err(MetadataError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(client.list("t").await, Err(MetadataError::Unauthorized)));
    }

    #[test]
    fn test_rejects_invalid_header_name() {
        let result = HttpMetadataClient::new(&MetadataSettings {
            auth_header: "bad header".to_string(),
            ..MetadataSettings::default()
        });
        assert!(result.is_err());
    }
}
