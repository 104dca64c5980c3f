//! Configuration for metadata service backends

use crate::metadata::{http_client::HttpMetadataClient, mock_store::MockMetadataClient, MetadataClient, MetadataError};
use crate::namespace::IdentityResolver;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Available metadata backends
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum MetadataBackend {
    #[default]
    Remote,
    Mock,
}

impl std::str::FromStr for MetadataBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" | "http" => Ok(MetadataBackend::Remote),
            "mock" => Ok(MetadataBackend::Mock),
            _ => Err(format!("Unknown metadata backend: {}", s)),
        }
    }
}

/// `metadata` section of the application config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataSettings {
    pub backend: MetadataBackend,
    pub base_url: String,
    /// Header carrying the identity token, both inbound and to the service
    pub auth_header: String,
    pub timeout_secs: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            backend: MetadataBackend::default(),
            base_url: "http://localhost:8081".to_string(),
            auth_header: "X-Auth-Token".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Both faces of one metadata backend
#[derive(Clone)]
pub struct MetadataServices {
    pub client: Arc<dyn MetadataClient>,
    pub resolver: Arc<dyn IdentityResolver>,
}

impl MetadataBackend {
    /// Environment override, falling back to `configured`
    pub fn from_env_or(configured: MetadataBackend) -> Self {
        match env::var("METADATA_BACKEND") {
            Ok(backend_str) => match backend_str.parse::<MetadataBackend>() {
                Ok(backend) => {
                    info!("Using metadata backend from environment: {:?}", backend);
                    backend
                }
                Err(e) => {
                    warn!("Invalid metadata backend in environment: {}. Using {:?}.", e, configured);
                    configured
                }
            },
            Err(_) => configured,
        }
    }

    pub fn create(&self, settings: &MetadataSettings) -> Result<MetadataServices, MetadataError> {
        match self {
            MetadataBackend::Remote => {
                info!("Creating remote metadata client for {}", settings.base_url);
                let client = Arc::new(HttpMetadataClient::new(settings)?);
                Ok(MetadataServices {
                    client: client.clone(),
                    resolver: client,
                })
            }
            MetadataBackend::Mock => {
                info!("Creating mock metadata client");
                let client = Arc::new(MockMetadataClient::new());
                Ok(MetadataServices {
                    client: client.clone(),
                    resolver: client,
                })
            }
        }
    }
}
