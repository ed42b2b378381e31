use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RegistryDate;

/// One digital-signature certificate issued to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub owner: String,
    pub valid_from: RegistryDate,
    pub valid_until: RegistryDate,
    pub crypt_status: String,
}

/// Software license deployment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseKind {
    Local,
    Network,
    Unknown,
}

impl LicenseKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }
}

/// Latest expiry date per licensed module, grouped by license kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub licenses: BTreeMap<LicenseKind, BTreeMap<String, RegistryDate>>,
}

impl LicenseSummary {
    /// Record a module expiry, keeping the later date when the module repeats.
    pub fn record(&mut self, kind: LicenseKind, module: impl Into<String>, expires: RegistryDate) {
        let modules = self.licenses.entry(kind).or_default();
        let current = modules.entry(module.into()).or_insert(expires);
        if *current < expires {
            *current = expires;
        }
    }

    pub fn expiry(&self, kind: LicenseKind, module: &str) -> Option<RegistryDate> {
        self.licenses
            .get(&kind)
            .and_then(|modules| modules.get(module))
            .copied()
    }

    pub fn module_count(&self) -> usize {
        self.licenses.values().map(BTreeMap::len).sum()
    }
}

/// Company registry extract for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub registration_date: Option<String>,
    pub ceo: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub activities: Option<Value>,
    pub beneficiaries: Option<Value>,
    pub vat_payer: bool,
    pub vat_number: Option<String>,
}

/// Endpoint-specific data attached to a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Certificates { certificates: Vec<Certificate> },
    Licenses(LicenseSummary),
    Company(CompanyRecord),
}
