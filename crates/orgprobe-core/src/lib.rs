//! # Orgprobe Core
//!
//! Bounded-concurrency batch lookups of organization codes against public
//! registries.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Identifier validation** for 8 and 10 character organization codes
//! - **Normalized outcomes** that separate found, not found, and failed
//! - **Endpoint adapters** that encapsulate one registry each
//! - **A bounded dispatcher** running many lookups with a fixed permit pool
//! - **A failure classifier** attributing opaque failures to their code
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | Endpoint adapter contract |
//! | [`adapters`] | Certificate, license and company registry adapters |
//! | [`classifier`] | Attribution of opaque failures |
//! | [`config`] | Lookup configuration and `ORGPROBE_*` environment overrides |
//! | [`dispatcher`] | Bounded-concurrency batch runner |
//! | [`domain`] | Organization codes, dates and registry payloads |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`lookup`] | Single request/response/interpret cycle |
//! | [`outcome`] | Lookup outcomes and batch summaries |
//! | [`throttling`] | Optional request-rate throttle |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use orgprobe_core::{adapters, Dispatcher, EndpointId, LookupConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(
//!         adapters::adapter_for(EndpointId::Companies),
//!         Arc::new(ReqwestHttpClient::new()),
//!         LookupConfig::from_env()?,
//!     )?;
//!
//!     for outcome in dispatcher.run(["38345394", "12345678"]).await {
//!         println!("{:?} {}", outcome.org_code(), outcome.status());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │ codes
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Dispatcher    │────▶│ Adapter bootstrap│ (once per batch)
//! │ intake + permits│     └──────────────────┘
//! └────────┬────────┘
//!          │ one task per valid code
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Single Lookup  │────▶│ HTTP Client      │
//! │ build/interpret │     │ (reqwest/fake)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Classifier      │ one LookupOutcome per code
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-identifier problems never surface as `Err`; they become
//! [`LookupOutcome::Failed`] with a [`FailureCause`]:
//!
//! ```rust
//! use orgprobe_core::{FailureCause, LookupOutcome};
//!
//! fn describe(outcome: &LookupOutcome) -> &'static str {
//!     match outcome.cause() {
//!         Some(FailureCause::InvalidIdentifier { .. }) => "fix the input",
//!         Some(FailureCause::Transport { .. }) => "try again later",
//!         Some(_) => "inspect the logs",
//!         None => "resolved",
//!     }
//! }
//! ```
//!
//! Only whole-batch conditions (cancellation, deadline) return a
//! [`BatchError`].

pub mod adapter;
pub mod adapters;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod lookup;
pub mod outcome;
pub mod throttling;

// Adapter contract and implementations
pub use adapter::{
    BootstrapError, BootstrapFuture, EndpointAdapter, EndpointId, ParseError, SessionToken,
};
pub use adapters::{adapter_for, CertificateAdapter, CompanyAdapter, LicenseAdapter};

// Failure attribution
pub use classifier::{classify, FailureClassifier, OpaqueFailure, UNATTRIBUTABLE_TARGET};

// Configuration
pub use config::{LookupConfig, DEFAULT_CONCURRENCY_LIMIT};

// Batch execution
pub use dispatcher::Dispatcher;
pub use lookup::lookup;

// Domain models
pub use domain::{
    Certificate, CompanyRecord, LicenseKind, LicenseSummary, OrganizationCode, Payload,
    RegistryDate, VALID_CODE_LENGTHS,
};

// Error types
pub use error::{BatchError, ConfigError, CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpFuture, HttpMethod, HttpRequest,
    HttpResponse, ReqwestHttpClient, DEFAULT_REQUEST_TIMEOUT,
};

// Outcomes
pub use outcome::{BatchSummary, FailureCause, LookupOutcome, OutcomeStatus, TransportFailureKind};

// Throttling
pub use throttling::RequestThrottle;
