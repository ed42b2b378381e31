use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::scalar_text;
use crate::adapter::{EndpointAdapter, EndpointId, ParseError, SessionToken};
use crate::domain::{LicenseKind, LicenseSummary, OrganizationCode, Payload, RegistryDate};
use crate::http_client::HttpRequest;
use crate::outcome::LookupOutcome;

pub const BASE_URL: &str = "https://api.medoc.ua/lic/key_medoc_test.php";

const HEADERS: [(&str, &str); 2] = [("User-Agent", "medoc1001208"), ("Host", "api.medoc.ua")];

/// License server of the accounting software vendor.
#[derive(Debug, Clone)]
pub struct LicenseAdapter {
    kinds: HashMap<String, LicenseKind>,
}

impl LicenseAdapter {
    pub fn new() -> Self {
        let kinds = [("12", LicenseKind::Local), ("13", LicenseKind::Network)]
            .into_iter()
            .map(|(code, kind)| (String::from(code), kind))
            .collect();
        Self { kinds }
    }

    /// Map a raw `LIC_Type` code; unrecognized codes are `Unknown`.
    pub fn kind(&self, raw: &str) -> LicenseKind {
        self.kinds
            .get(raw.trim())
            .copied()
            .unwrap_or(LicenseKind::Unknown)
    }
}

impl Default for LicenseAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl EndpointAdapter for LicenseAdapter {
    fn id(&self) -> EndpointId {
        EndpointId::Licenses
    }

    fn build_request(&self, code: &OrganizationCode, _token: Option<&SessionToken>) -> HttpRequest {
        HttpRequest::get(BASE_URL)
            .with_headers(HEADERS)
            .with_query("edrpo", code.as_str())
            .with_query("type", "json")
    }

    fn interpret(&self, body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError> {
        let entries: Option<Vec<LicenseEntry>> = serde_json::from_str(body)?;
        let entries = entries.unwrap_or_default();
        if entries.is_empty() {
            return Ok(LookupOutcome::empty(code.clone()));
        }

        let mut summary = LicenseSummary::default();
        for entry in entries {
            let kind = scalar_text(&entry.lic_type)
                .map_or(LicenseKind::Unknown, |raw| self.kind(&raw));
            for module in entry.modules {
                summary.record(kind, module.name_module, RegistryDate::parse_long(&module.end_date)?);
            }
        }

        Ok(LookupOutcome::success(code.clone(), Payload::Licenses(summary)))
    }
}

#[derive(Debug, Deserialize)]
struct LicenseEntry {
    #[serde(rename = "LIC_Type", default)]
    lic_type: Value,
    #[serde(rename = "Lic_TypeR", default)]
    modules: Vec<LicenseModule>,
}

#[derive(Debug, Deserialize)]
struct LicenseModule {
    name_module: String,
    end_date: String,
}
