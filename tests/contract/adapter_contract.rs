use std::sync::Arc;
use std::time::Duration;

use orgprobe_core::{
    adapter_for, Dispatcher, EndpointAdapter, EndpointId, HttpClient, HttpFuture, HttpMethod,
    HttpRequest, HttpResponse, LookupConfig, OrganizationCode, OutcomeStatus, Payload,
    SessionToken,
};

const CERTIFICATES_BODY: &str = r#"{"js": {"id": ["0A1B"], "start_date": ["10.03.21"],
    "end_date": ["10.03.23"], "text": ["ПП &quot;Світанок&quot;"], "FORCRYPT": ["1"]}}"#;

const LICENSES_BODY: &str =
    r#"[{"LIC_Type": "12", "Lic_TypeR": [{"name_module": "Zvit", "end_date": "31/12/2024"}]}]"#;

const COMPANIES_BODY: &str = r#"{"overall": 1, "companies": [{"full_name": "ТОВ Приклад",
    "short_name": "Приклад", "warnings": []}]}"#;

/// Serves canned registry bodies, plus a session cookie for any POST to a
/// page other than the lookup script.
struct RegistryDouble {
    body: &'static str,
}

impl HttpClient for RegistryDouble {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let is_session_page = request.method == HttpMethod::Post
            && request
                .body
                .as_deref()
                .is_some_and(|body| body.starts_with("ORGEDRPOUNUMBER="));
        Box::pin(async move {
            if is_session_page {
                return Ok(HttpResponse::ok("<html/>").with_cookie("PHPSESSID", "contract-session"));
            }
            Ok(HttpResponse::ok(self.body))
        })
    }
}

fn code() -> OrganizationCode {
    OrganizationCode::parse("38345394").expect("valid code")
}

fn sample_body(id: EndpointId) -> &'static str {
    match id {
        EndpointId::Certificates => CERTIFICATES_BODY,
        EndpointId::Licenses => LICENSES_BODY,
        EndpointId::Companies => COMPANIES_BODY,
    }
}

#[test]
fn every_adapter_reports_its_own_endpoint() {
    for id in EndpointId::ALL {
        assert_eq!(adapter_for(id).id(), id);
    }
}

#[test]
fn every_adapter_puts_the_code_into_its_request() {
    let token = SessionToken::new("contract-session");
    for id in EndpointId::ALL {
        let request = adapter_for(id).build_request(&code(), Some(&token));
        let in_query = request.query.iter().any(|(_, value)| value == "38345394");
        let in_body = request
            .body
            .as_deref()
            .is_some_and(|body| body.contains("38345394"));
        assert!(in_query || in_body, "{id} request does not carry the code");
    }
}

#[test]
fn every_adapter_reads_null_as_no_data() {
    for id in EndpointId::ALL {
        let outcome = adapter_for(id)
            .interpret("null", &code())
            .expect("null is a valid answer");
        assert_eq!(outcome.status(), OutcomeStatus::Empty, "{id}");
        assert_eq!(outcome.org_code(), Some("38345394"));
    }
}

#[test]
fn every_adapter_rejects_non_json_bodies() {
    for id in EndpointId::ALL {
        let adapter: Arc<dyn EndpointAdapter> = adapter_for(id);
        assert!(
            adapter.interpret("<html>502 Bad Gateway</html>", &code()).is_err(),
            "{id} accepted an HTML body"
        );
    }
}

#[test]
fn every_adapter_turns_a_sample_answer_into_its_payload() {
    for id in EndpointId::ALL {
        let outcome = adapter_for(id)
            .interpret(sample_body(id), &code())
            .expect("sample parses");

        let matches_endpoint = matches!(
            (id, outcome.payload()),
            (EndpointId::Certificates, Some(Payload::Certificates { .. }))
                | (EndpointId::Licenses, Some(Payload::Licenses(_)))
                | (EndpointId::Companies, Some(Payload::Company(_)))
        );
        assert!(matches_endpoint, "{id} produced {outcome:?}");
    }
}

#[tokio::test]
async fn every_adapter_resolves_a_batch_through_the_dispatcher() {
    for id in EndpointId::ALL {
        let dispatcher = Dispatcher::new(
            adapter_for(id),
            Arc::new(RegistryDouble {
                body: sample_body(id),
            }),
            LookupConfig::default().with_request_timeout(Duration::from_secs(1)),
        )
        .expect("valid config");

        let outcomes = dispatcher.run(["38345394", "1234567890"]).await;

        assert_eq!(outcomes.len(), 2, "{id}");
        assert!(
            outcomes
                .iter()
                .all(|outcome| outcome.status() == OutcomeStatus::Success),
            "{id} produced {outcomes:?}"
        );
    }
}
