//! Test doubles shared by the behavior suites: a scripted transport and a
//! counting endpoint adapter. Nothing here touches the network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use orgprobe_core::{
    BootstrapError, BootstrapFuture, Certificate, Dispatcher, EndpointAdapter, EndpointId,
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, LookupConfig, LookupOutcome,
    OrganizationCode, ParseError, Payload, RegistryDate, SessionToken,
};

/// Body the fake adapter reads as "data found".
pub const FOUND: &str = "found";
/// Body the fake adapter reads as "no data".
pub const NOT_FOUND: &str = "none";

/// What the scripted transport answers for a code.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(&'static str),
    Status(u16),
    Fail(HttpError),
    /// Never answers within any test timeout.
    Hang,
}

pub struct ScriptedHttp {
    replies: HashMap<String, Reply>,
    requested: Mutex<Vec<String>>,
    fallback: Reply,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedHttp {
    pub fn new(fallback: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            requested: Mutex::new(Vec::new()),
            fallback,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(mut self, code: &str, reply: Reply) -> Self {
        self.replies.insert(code.to_owned(), reply);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Codes in the order their requests reached the transport.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("request log").clone()
    }
}

impl HttpClient for ScriptedHttp {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = request.query_value("code") {
            self.requested
                .lock()
                .expect("request log")
                .push(code.to_owned());
        }
        let reply = request
            .query_value("code")
            .and_then(|code| self.replies.get(code))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let result = match reply {
                Reply::Body(body) => Ok(HttpResponse::ok(body)),
                Reply::Status(status) => Ok(HttpResponse::with_status(status, "")),
                Reply::Fail(error) => Err(error),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(HttpError::timeout("scripted hang elapsed"))
                }
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

/// How the fake adapter's session bootstrap behaves.
#[derive(Debug, Clone, Copy)]
enum Session {
    Token(&'static str),
    Refused(&'static str),
    Hangs,
    PanicsWhileRunning,
    PanicsWhileStarting,
}

/// Adapter that reads [`FOUND`] / [`NOT_FOUND`] bodies and counts every call.
#[derive(Default)]
pub struct FakeAdapter {
    session: Option<Session>,
    panic_on: Option<&'static str>,
    builds: AtomicUsize,
    interprets: AtomicUsize,
    bootstraps: AtomicUsize,
    tokens: Mutex<Vec<Option<String>>>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, token: &'static str) -> Self {
        self.session = Some(Session::Token(token));
        self
    }

    pub fn with_failing_bootstrap(mut self, message: &'static str) -> Self {
        self.session = Some(Session::Refused(message));
        self
    }

    /// Session setup that never completes.
    pub fn with_hanging_bootstrap(mut self) -> Self {
        self.session = Some(Session::Hangs);
        self
    }

    /// Session setup whose future panics once polled.
    pub fn with_bootstrap_panicking_in_future(mut self) -> Self {
        self.session = Some(Session::PanicsWhileRunning);
        self
    }

    /// Session setup that panics before returning a future.
    pub fn with_bootstrap_panicking_on_call(mut self) -> Self {
        self.session = Some(Session::PanicsWhileStarting);
        self
    }

    pub fn panicking_on(mut self, code: &'static str) -> Self {
        self.panic_on = Some(code);
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn interprets(&self) -> usize {
        self.interprets.load(Ordering::SeqCst)
    }

    pub fn bootstraps(&self) -> usize {
        self.bootstraps.load(Ordering::SeqCst)
    }

    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens.lock().expect("token log").clone()
    }
}

impl EndpointAdapter for FakeAdapter {
    fn id(&self) -> EndpointId {
        EndpointId::Certificates
    }

    fn build_request(&self, code: &OrganizationCode, token: Option<&SessionToken>) -> HttpRequest {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .expect("token log")
            .push(token.map(|token| token.as_str().to_owned()));
        HttpRequest::get("https://registry.test/lookup").with_query("code", code.as_str())
    }

    fn interpret(&self, body: &str, code: &OrganizationCode) -> Result<LookupOutcome, ParseError> {
        self.interprets.fetch_add(1, Ordering::SeqCst);
        if self.panic_on == Some(code.as_str()) {
            panic!("fake adapter blew up on {code}");
        }

        match body.trim() {
            FOUND => Ok(LookupOutcome::success(
                code.clone(),
                Payload::Certificates {
                    certificates: vec![Certificate {
                        id: format!("cert-{code}"),
                        owner: String::from("Test LLC"),
                        valid_from: RegistryDate::from_calendar(2020, 1, 1)?,
                        valid_until: RegistryDate::from_calendar(2022, 1, 1)?,
                        crypt_status: String::from("1"),
                    }],
                },
            )),
            NOT_FOUND => Ok(LookupOutcome::empty(code.clone())),
            other => Err(ParseError::new(format!("unexpected body {other:?}"))),
        }
    }

    fn bootstrap<'a>(
        &'a self,
        _http: &'a dyn HttpClient,
        _timeout: Duration,
    ) -> Option<BootstrapFuture<'a>> {
        let session = self.session?;
        self.bootstraps.fetch_add(1, Ordering::SeqCst);
        if let Session::PanicsWhileStarting = session {
            panic!("fake adapter could not start its session");
        }

        Some(Box::pin(async move {
            match session {
                Session::Token(token) => Ok(SessionToken::new(token)),
                Session::Refused(message) => Err(BootstrapError::new(message)),
                Session::Hangs => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(SessionToken::new("too-late"))
                }
                Session::PanicsWhileRunning | Session::PanicsWhileStarting => {
                    panic!("fake adapter session setup blew up")
                }
            }
        }))
    }

    fn requires_session(&self) -> bool {
        self.session.is_some()
    }
}

pub fn dispatcher(
    adapter: &Arc<FakeAdapter>,
    http: &Arc<ScriptedHttp>,
    config: LookupConfig,
) -> Dispatcher {
    Dispatcher::new(adapter.clone(), http.clone(), config).expect("valid config")
}

pub fn outcome_for<'a>(outcomes: &'a [LookupOutcome], code: &str) -> &'a LookupOutcome {
    outcomes
        .iter()
        .find(|outcome| outcome.org_code() == Some(code))
        .unwrap_or_else(|| panic!("no outcome for {code}"))
}
