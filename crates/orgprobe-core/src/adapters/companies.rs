use serde::Deserialize;
use serde_json::Value;

use super::scalar_text;
use crate::adapter::{EndpointAdapter, EndpointId, ParseError, SessionToken};
use crate::domain::{CompanyRecord, OrganizationCode, Payload};
use crate::http_client::HttpRequest;
use crate::outcome::LookupOutcome;

pub const BASE_URL: &str = "https://opendatabot.com/iframe/search";

const HEADERS: [(&str, &str); 2] = [("User-Agent", "OD-Bot"), ("Host", "opendatabot.com")];

/// Warning type marking VAT registration.
const VAT_WARNING: &str = "pdv";

/// Open company register search.
#[derive(Debug, Clone, Default)]
pub struct CompanyAdapter;

impl CompanyAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl EndpointAdapter for CompanyAdapter {
    fn id(&self) -> EndpointId {
        EndpointId::Companies
    }

    fn build_request(&self, code: &OrganizationCode, _token: Option<&SessionToken>) -> HttpRequest {
        HttpRequest::get(BASE_URL)
            .with_headers(HEADERS)
            .with_query("text", code.as_str())
            .with_query("type", "code_search")
            .with_query("start", "0")
    }

    fn interpret(&self, body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError> {
        let response: Option<SearchResponse> = serde_json::from_str(body)?;
        let Some(response) = response.filter(|response| response.overall.unwrap_or(0) > 0) else {
            return Ok(LookupOutcome::empty(code.clone()));
        };

        let company = response.companies.into_iter().next().ok_or_else(|| {
            ParseError::new(format!(
                "search reported {} matches but listed none",
                response.overall.unwrap_or(0)
            ))
        })?;

        Ok(LookupOutcome::success(
            code.clone(),
            Payload::Company(company.into_record()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    overall: Option<u64>,
    #[serde(default)]
    companies: Vec<RawCompany>,
}

#[derive(Debug, Deserialize)]
struct RawCompany {
    full_name: Option<String>,
    short_name: Option<String>,
    edr: Option<RawEdr>,
    ceo_name: Option<String>,
    location: Option<String>,
    status: Option<String>,
    activities: Option<Value>,
    beneficiaries: Option<Value>,
    #[serde(default)]
    warnings: Vec<RawWarning>,
}

#[derive(Debug, Deserialize)]
struct RawEdr {
    registration: Option<RawRegistration>,
}

#[derive(Debug, Deserialize)]
struct RawRegistration {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWarning {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    date_cancellation: Value,
    #[serde(default)]
    number: Value,
}

impl RawWarning {
    fn is_active_vat(&self) -> bool {
        self.kind.as_deref() == Some(VAT_WARNING) && !is_set(&self.date_cancellation)
    }
}

impl RawCompany {
    fn into_record(self) -> CompanyRecord {
        let name = non_blank(self.full_name);
        let short_name = non_blank(self.short_name).or_else(|| name.clone());
        let vat = self.warnings.iter().rev().find(|warning| warning.is_active_vat());

        CompanyRecord {
            name,
            short_name,
            registration_date: self
                .edr
                .and_then(|edr| edr.registration)
                .and_then(|registration| non_blank(registration.date)),
            ceo: non_blank(self.ceo_name),
            location: non_blank(self.location),
            status: non_blank(self.status),
            activities: self.activities.filter(is_set),
            beneficiaries: self.beneficiaries.filter(is_set),
            vat_payer: vat.is_some(),
            vat_number: vat.and_then(|warning| scalar_text(&warning.number)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// JSON truthiness for optional registry fields.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(_) => true,
    }
}
