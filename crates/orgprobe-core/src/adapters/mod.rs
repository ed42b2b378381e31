//! Endpoint adapters for the supported registries.
//!
//! | Adapter | Registry | Session |
//! |---------|----------|---------|
//! | [`CertificateAdapter`] | Qualified signature certificates | `PHPSESSID` cookie |
//! | [`LicenseAdapter`] | Accounting software licenses | none |
//! | [`CompanyAdapter`] | Company register extracts | none |

use std::sync::Arc;

use serde_json::Value;

use crate::adapter::{EndpointAdapter, EndpointId};

pub mod certificates;
pub mod companies;
pub mod licenses;

pub use certificates::CertificateAdapter;
pub use companies::CompanyAdapter;
pub use licenses::LicenseAdapter;

/// Build the default adapter for `id`.
pub fn adapter_for(id: EndpointId) -> Arc<dyn EndpointAdapter> {
    match id {
        EndpointId::Certificates => Arc::new(CertificateAdapter::new()),
        EndpointId::Licenses => Arc::new(LicenseAdapter::new()),
        EndpointId::Companies => Arc::new(CompanyAdapter::new()),
    }
}

/// Text form of a JSON scalar; registries mix strings and numbers freely.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
