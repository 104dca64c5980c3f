//! Caller identity extracted from a request

use actix_web::HttpRequest;
use std::fmt;

use crate::error::IngestError;

/// The caller's opaque identity token. It is forwarded to collaborators and
/// never written to logs.
#[derive(Clone, PartialEq)]
pub struct UserContext {
    identity: String,
}

impl UserContext {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    /// Extract the token from `header`; missing or blank is `MissingIdentity`
    pub fn from_request(req: &HttpRequest, header: &str) -> Result<Self, IngestError> {
        let identity = req
            .headers()
            .get(header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(IngestError::MissingIdentity)?;
        Ok(Self::new(identity))
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("identity", &"<redacted>")
            .finish()
    }
}
