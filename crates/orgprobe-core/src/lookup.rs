//! One request/response/interpret cycle for one organization code.
//!
//! Every failure path ends in an outcome tagged with the code that was
//! looked up; nothing is raised past this boundary.

use tracing::{debug, warn};

use crate::adapter::{EndpointAdapter, SessionToken};
use crate::config::LookupConfig;
use crate::domain::OrganizationCode;
use crate::http_client::{HttpClient, HttpErrorKind};
use crate::outcome::{FailureCause, LookupOutcome, TransportFailureKind};

/// Look up `code` through `adapter`.
///
/// Transport failures and non-2xx statuses become `Failed` (or `Empty` when
/// `raise_on_transport_failure` is off), a blank body is `Empty`, and any
/// other body is handed to [`EndpointAdapter::interpret`].
pub async fn lookup(
    adapter: &dyn EndpointAdapter,
    http: &dyn HttpClient,
    code: &OrganizationCode,
    token: Option<&SessionToken>,
    config: &LookupConfig,
) -> LookupOutcome {
    let endpoint = adapter.id();
    let request = adapter
        .build_request(code, token)
        .with_timeout(config.request_timeout);

    debug!(%endpoint, org_code = %code, method = request.method.as_str(), url = %request.url, "issuing lookup request");

    let response = match tokio::time::timeout(config.request_timeout, http.execute(request)).await
    {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            return transport_failure(
                code,
                transport_kind(error.kind()),
                format!("request on {endpoint} failed: {}", error.message()),
                config,
            );
        }
        Err(_) => {
            return transport_failure(
                code,
                TransportFailureKind::Timeout,
                format!(
                    "request on {endpoint} timed out after {:?}",
                    config.request_timeout
                ),
                config,
            );
        }
    };

    if !response.is_success() {
        return transport_failure(
            code,
            TransportFailureKind::Status(response.status),
            format!("{endpoint} returned status {}", response.status),
            config,
        );
    }

    if response.is_blank() {
        debug!(%endpoint, org_code = %code, "empty response body");
        return LookupOutcome::empty(code.clone());
    }

    match adapter.interpret(&response.body, code) {
        Ok(outcome) if outcome.org_code() == Some(code.as_str()) => outcome,
        Ok(outcome) => parse_failure(
            code,
            format!(
                "{endpoint} adapter answered for {:?} instead of {code}",
                outcome.org_code()
            ),
            config,
        ),
        Err(error) => parse_failure(code, error.message().to_owned(), config),
    }
}

fn transport_kind(kind: HttpErrorKind) -> TransportFailureKind {
    match kind {
        HttpErrorKind::Timeout => TransportFailureKind::Timeout,
        HttpErrorKind::Connect => TransportFailureKind::Connect,
        HttpErrorKind::Other => TransportFailureKind::Other,
    }
}

fn transport_failure(
    code: &OrganizationCode,
    failure: TransportFailureKind,
    message: String,
    config: &LookupConfig,
) -> LookupOutcome {
    if config.raise_on_transport_failure {
        warn!(org_code = %code, %message, "lookup transport failure");
        return LookupOutcome::failed(code.as_str(), FailureCause::Transport { failure, message });
    }

    warn!(org_code = %code, %message, "transport failure absorbed as empty result");
    LookupOutcome::empty(code.clone())
}

fn parse_failure(code: &OrganizationCode, message: String, config: &LookupConfig) -> LookupOutcome {
    if config.raise_on_parse_failure {
        warn!(org_code = %code, %message, "response could not be parsed");
        return LookupOutcome::failed(code.as_str(), FailureCause::ParseFailure { message });
    }

    warn!(org_code = %code, %message, "parse failure absorbed as empty result");
    LookupOutcome::empty(code.clone())
}
