use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

use super::scalar_text;
use crate::adapter::{
    BootstrapError, BootstrapFuture, EndpointAdapter, EndpointId, ParseError, SessionToken,
};
use crate::domain::{Certificate, OrganizationCode, Payload, RegistryDate};
use crate::http_client::{HttpClient, HttpRequest};
use crate::outcome::LookupOutcome;

/// Page that hands out the session cookie.
pub const ENTRY_URL: &str = "http://uakey.com.ua/ua/setificate-one-office/text=3&page=1?lang=ukr#blocy";
/// Script answering certificate lookups for a session.
pub const REQUEST_URL: &str = "http://uakey.com.ua/inc/sertificate_from_edrpo.php";
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Any well-formed code works for opening a session.
const PROBE_CODE: &str = "123456789199";

const BROWSER_HEADERS: [(&str, &str); 5] = [
    ("Accept", "*/*"),
    ("Accept-Language", "ru-RU,ru;q=0.8,en-US;q=0.6,en;q=0.4"),
    ("Content-Type", "application/octet-stream"),
    ("Origin", "http://uakey.com.ua"),
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3013.3 Safari/537.36",
    ),
];

/// Certificate authority registry. Needs a `PHPSESSID` session per batch.
#[derive(Debug, Clone, Default)]
pub struct CertificateAdapter;

impl CertificateAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl EndpointAdapter for CertificateAdapter {
    fn id(&self) -> EndpointId {
        EndpointId::Certificates
    }

    fn build_request(&self, code: &OrganizationCode, token: Option<&SessionToken>) -> HttpRequest {
        let mut request = HttpRequest::post(REQUEST_URL).with_headers(BROWSER_HEADERS);

        if let Some(token) = token {
            request = request
                .with_query(SESSION_COOKIE, token.as_str())
                .with_cookie(SESSION_COOKIE, token.as_str());
        }

        request
            .with_query(
                "JsHttpRequest",
                format!("{}0-xml", OffsetDateTime::now_utc().unix_timestamp()),
            )
            .with_form([("SertEdrpo", code.as_str())])
    }

    fn interpret(&self, body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError> {
        let response: Option<CertificateResponse> = serde_json::from_str(body)?;
        let Some(columns) = response.and_then(|response| response.js) else {
            return Ok(LookupOutcome::empty(code.clone()));
        };
        if columns.id.first().map_or(true, String::is_empty) {
            return Ok(LookupOutcome::empty(code.clone()));
        }

        let certificates = columns.into_certificates()?;
        debug!(org_code = %code, count = certificates.len(), "certificates found");
        Ok(LookupOutcome::success(
            code.clone(),
            Payload::Certificates { certificates },
        ))
    }

    fn bootstrap<'a>(
        &'a self,
        http: &'a dyn HttpClient,
        timeout: Duration,
    ) -> Option<BootstrapFuture<'a>> {
        Some(Box::pin(async move {
            let request = HttpRequest::post(ENTRY_URL)
                .with_headers(BROWSER_HEADERS)
                .with_form([("ORGEDRPOUNUMBER", PROBE_CODE)])
                .with_timeout(timeout);

            let response = http.execute(request).await.map_err(|error| {
                BootstrapError::new(format!("session request failed: {}", error.message()))
            })?;
            if !response.is_success() {
                return Err(BootstrapError::new(format!(
                    "session request returned status {}",
                    response.status
                )));
            }

            response
                .cookie(SESSION_COOKIE)
                .filter(|value| !value.is_empty())
                .map(SessionToken::new)
                .ok_or_else(|| {
                    BootstrapError::new(format!("entry page did not set a {SESSION_COOKIE} cookie"))
                })
        }))
    }

    fn requires_session(&self) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct CertificateResponse {
    js: Option<CertificateColumns>,
}

/// The registry answers column-wise: entry `i` of every array describes
/// certificate `i`.
#[derive(Debug, Deserialize)]
struct CertificateColumns {
    #[serde(default)]
    id: Vec<String>,
    #[serde(default)]
    start_date: Vec<String>,
    #[serde(default)]
    end_date: Vec<String>,
    #[serde(default)]
    text: Vec<String>,
    #[serde(rename = "FORCRYPT", default)]
    forcrypt: Vec<Value>,
}

impl CertificateColumns {
    fn into_certificates(self) -> Result<Vec<Certificate>, ParseError> {
        let rows = self.id.len();
        for (name, len) in [
            ("start_date", self.start_date.len()),
            ("end_date", self.end_date.len()),
            ("text", self.text.len()),
            ("FORCRYPT", self.forcrypt.len()),
        ] {
            if len < rows {
                return Err(ParseError::new(format!(
                    "column {name} has {len} entries, expected {rows}"
                )));
            }
        }

        self.id
            .into_iter()
            .enumerate()
            .map(|(index, id)| {
                Ok(Certificate {
                    id,
                    owner: self.text[index].replace("&quot;", "\""),
                    valid_from: RegistryDate::parse_short(&self.start_date[index])?,
                    valid_until: RegistryDate::parse_short(&self.end_date[index])?,
                    crypt_status: scalar_text(&self.forcrypt[index]).unwrap_or_default(),
                })
            })
            .collect()
    }
}
