//! Endpoint adapter contract.
//!
//! An adapter knows one remote registry: how to build the request for an
//! organization code, how to read the registry's response, and whether a
//! session has to be established before the first lookup of a batch.
//!
//! The dispatcher only ever talks to adapters through [`EndpointAdapter`],
//! so a new registry is one small implementation rather than another copy of
//! the batching engine.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use orgprobe_core::{EndpointAdapter, EndpointId, HttpRequest, LookupOutcome, OrganizationCode, ParseError, SessionToken};
//!
//! struct EchoAdapter;
//!
//! impl EndpointAdapter for EchoAdapter {
//!     fn id(&self) -> EndpointId {
//!         EndpointId::Companies
//!     }
//!
//!     fn build_request(&self, code: &OrganizationCode, _token: Option<&SessionToken>) -> HttpRequest {
//!         HttpRequest::get("https://registry.example/lookup").with_query("code", code.as_str())
//!     }
//!
//!     fn interpret(&self, _body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError> {
//!         Ok(LookupOutcome::empty(code.clone()))
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::OrganizationCode;
use crate::http_client::{HttpClient, HttpRequest};
use crate::outcome::LookupOutcome;
use crate::ValidationError;

/// Identifiers of the registries orgprobe knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointId {
    Certificates,
    Licenses,
    Companies,
}

impl EndpointId {
    pub const ALL: [Self; 3] = [Self::Certificates, Self::Licenses, Self::Companies];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Certificates => "certificates",
            Self::Licenses => "licenses",
            Self::Companies => "companies",
        }
    }
}

impl Display for EndpointId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "certificates" => Ok(Self::Certificates),
            "licenses" => Ok(Self::Licenses),
            "companies" => Ok(Self::Companies),
            _ => Err(ValidationError::InvalidEndpoint {
                value: value.to_owned(),
            }),
        }
    }
}

/// Session context produced once per batch by [`EndpointAdapter::bootstrap`]
/// and shared read-only by every lookup of that batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Response body that could not be read into the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(format!("malformed JSON: {error}"))
    }
}

impl From<ValidationError> for ParseError {
    fn from(error: ValidationError) -> Self {
        Self::new(error.to_string())
    }
}

/// Session bootstrap failure; fatal to the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapError {
    message: String,
}

impl BootstrapError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BootstrapError {}

/// Boxed future returned by [`EndpointAdapter::bootstrap`].
pub type BootstrapFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SessionToken, BootstrapError>> + Send + 'a>>;

/// Per-registry capability consumed by single lookups and the dispatcher.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one adapter instance serves every
/// concurrent lookup of a batch.
pub trait EndpointAdapter: Send + Sync {
    /// Registry this adapter talks to.
    fn id(&self) -> EndpointId;

    /// Build the lookup request for `code`, using the batch session if any.
    fn build_request(&self, code: &OrganizationCode, token: Option<&SessionToken>) -> HttpRequest;

    /// Read a non-empty response body into an outcome for `code`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the body does not have the expected shape.
    /// Whether that becomes a failed outcome or an empty one is decided by
    /// the caller's configuration, not the adapter.
    fn interpret(&self, body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError>;

    /// One-time session setup run before any lookup of a batch.
    ///
    /// Returns `None` for registries that need no session.
    fn bootstrap<'a>(
        &'a self,
        http: &'a dyn HttpClient,
        timeout: Duration,
    ) -> Option<BootstrapFuture<'a>> {
        let _ = (http, timeout);
        None
    }

    /// Whether [`EndpointAdapter::bootstrap`] does any work for this registry.
    fn requires_session(&self) -> bool {
        false
    }
}
