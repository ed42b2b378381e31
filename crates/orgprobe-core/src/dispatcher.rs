//! Bounded-concurrency batch dispatcher.
//!
//! A batch goes through four steps:
//!
//! 1. **Intake**: every submitted string is validated. Invalid ones resolve
//!    to `Failed{InvalidIdentifier}` immediately and never take a permit.
//! 2. **Bootstrap**: if the adapter needs a session, it is established once.
//!    When that fails, every valid identifier resolves to
//!    `Failed{BootstrapFailed}` and no request is built.
//! 3. **Fan-out**: one task per valid identifier. A task holds one of
//!    `concurrency_limit` permits from acquisition until its lookup resolves.
//!    Permits are handed out in submission order before each task is spawned.
//! 4. **Settle**: task results go through the [`FailureClassifier`], so a
//!    task that died without producing an outcome still yields one.
//!
//! Dropping a running batch (cancellation, deadline) aborts every
//! outstanding task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::adapter::{EndpointAdapter, EndpointId, SessionToken};
use crate::classifier::{FailureClassifier, OpaqueFailure};
use crate::config::LookupConfig;
use crate::domain::OrganizationCode;
use crate::error::{BatchError, ConfigError};
use crate::http_client::HttpClient;
use crate::lookup::lookup;
use crate::outcome::{FailureCause, LookupOutcome};
use crate::throttling::RequestThrottle;

/// Runs batches of lookups against one endpoint adapter.
#[derive(Clone)]
pub struct Dispatcher {
    adapter: Arc<dyn EndpointAdapter>,
    http: Arc<dyn HttpClient>,
    config: LookupConfig,
    throttle: Option<RequestThrottle>,
}

impl Dispatcher {
    /// Create a dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `config` fails validation.
    pub fn new(
        adapter: Arc<dyn EndpointAdapter>,
        http: Arc<dyn HttpClient>,
        config: LookupConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let throttle = config.requests_per_second.map(RequestThrottle::per_second);

        Ok(Self {
            adapter,
            http,
            config,
            throttle,
        })
    }

    pub fn endpoint(&self) -> EndpointId {
        self.adapter.id()
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Resolve every submitted identifier to exactly one outcome.
    ///
    /// Outcomes for invalid identifiers come first; the rest follow in
    /// completion order.
    pub async fn run<I, S>(&self, codes: I) -> Vec<LookupOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let submitted: Vec<String> = codes
            .into_iter()
            .map(|code| code.as_ref().to_owned())
            .collect();
        self.dispatch(submitted).await
    }

    /// Like [`Dispatcher::run`], but gives up as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Cancelled`]; outstanding lookups are aborted.
    pub async fn run_cancellable<I, S>(
        &self,
        codes: I,
        cancel: &CancellationToken,
    ) -> Result<Vec<LookupOutcome>, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(endpoint = %self.endpoint(), "batch cancelled");
                Err(BatchError::Cancelled)
            }
            outcomes = self.run(codes) => Ok(outcomes),
        }
    }

    /// Like [`Dispatcher::run`], bounded by an overall deadline.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::DeadlineExceeded`]; outstanding lookups are aborted.
    pub async fn run_with_deadline<I, S>(
        &self,
        codes: I,
        deadline: Duration,
    ) -> Result<Vec<LookupOutcome>, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tokio::time::timeout(deadline, self.run(codes))
            .await
            .map_err(|_| {
                info!(endpoint = %self.endpoint(), ?deadline, "batch deadline exceeded");
                BatchError::DeadlineExceeded { deadline }
            })
    }

    /// Look up a single identifier, bootstrapping a session if needed.
    pub async fn lookup_one(&self, code: &str) -> LookupOutcome {
        let org_code = match OrganizationCode::parse(code) {
            Ok(org_code) => org_code,
            Err(error) => return invalid_identifier(code, &error.to_string()),
        };

        let token = match self.bootstrap().await {
            Ok(token) => token,
            Err(message) => {
                return LookupOutcome::failed(org_code.as_str(), FailureCause::BootstrapFailed { message });
            }
        };

        let task = lookup(
            self.adapter.as_ref(),
            self.http.as_ref(),
            &org_code,
            token.as_ref(),
            &self.config,
        );
        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let failure =
                    OpaqueFailure::attributed(org_code.as_str(), panic_message("lookup", panic.as_ref()));
                FailureClassifier::for_batch([code]).classify(&failure)
            }
        }
    }

    async fn dispatch(&self, submitted: Vec<String>) -> Vec<LookupOutcome> {
        let started = Instant::now();
        let endpoint = self.endpoint();
        let mut outcomes = Vec::with_capacity(submitted.len());
        let mut valid = Vec::with_capacity(submitted.len());

        for raw in &submitted {
            match OrganizationCode::parse(raw) {
                Ok(code) => valid.push(code),
                Err(error) => {
                    debug!(%endpoint, org_code = %raw, %error, "rejected at intake");
                    outcomes.push(invalid_identifier(raw, &error.to_string()));
                }
            }
        }

        info!(
            %endpoint,
            submitted = submitted.len(),
            valid = valid.len(),
            limit = self.config.concurrency_limit,
            "dispatching batch"
        );

        if valid.is_empty() {
            return outcomes;
        }

        let token = match self.bootstrap().await {
            Ok(token) => token.map(Arc::new),
            Err(message) => {
                error!(%endpoint, %message, "session bootstrap failed; failing batch");
                outcomes.extend(valid.into_iter().map(|code| {
                    LookupOutcome::failed(
                        code.as_str(),
                        FailureCause::BootstrapFailed {
                            message: message.clone(),
                        },
                    )
                }));
                return outcomes;
            }
        };

        let permits = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut tasks = JoinSet::new();
        let mut results = Vec::with_capacity(valid.len());

        // Permits are taken before spawning; lookups start in submission order.
        for code in valid {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                results.push(Err(OpaqueFailure::attributed(code.as_str(), "permit pool closed")));
                continue;
            };
            let adapter = Arc::clone(&self.adapter);
            let http = Arc::clone(&self.http);
            let throttle = self.throttle.clone();
            let token = token.clone();
            let config = self.config.clone();

            tasks.spawn(async move {
                let _permit = permit;
                if let Some(throttle) = &throttle {
                    throttle.until_ready().await;
                }

                let task = lookup(
                    adapter.as_ref(),
                    http.as_ref(),
                    &code,
                    token.as_deref(),
                    &config,
                );
                AssertUnwindSafe(task)
                    .catch_unwind()
                    .await
                    .map_err(|panic| {
                        OpaqueFailure::attributed(code.as_str(), panic_message("lookup", panic.as_ref()))
                    })
            });
        }

        while let Some(joined) = tasks.join_next().await {
            results.push(joined.unwrap_or_else(|error| Err(OpaqueFailure::new(error.to_string()))));
        }

        outcomes.extend(FailureClassifier::for_batch(&submitted).settle(results));

        info!(
            %endpoint,
            outcomes = outcomes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        outcomes
    }

    /// Run the adapter's bootstrap, if any, under the request timeout.
    ///
    /// A panic while building or driving the bootstrap fails the batch, not the caller.
    async fn bootstrap(&self) -> Result<Option<SessionToken>, String> {
        let timeout = self.config.request_timeout;
        let pending = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.adapter.bootstrap(self.http.as_ref(), timeout)
        }))
        .map_err(|panic| bootstrap_panicked(panic.as_ref()))?;
        let Some(pending) = pending else {
            return Ok(None);
        };

        debug!(endpoint = %self.endpoint(), "bootstrapping session");
        match tokio::time::timeout(timeout, AssertUnwindSafe(pending).catch_unwind()).await {
            Ok(Ok(Ok(token))) => Ok(Some(token)),
            Ok(Ok(Err(error))) => Err(error.message().to_owned()),
            Ok(Err(panic)) => Err(bootstrap_panicked(panic.as_ref())),
            Err(_) => Err(format!("bootstrap timed out after {timeout:?}")),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("endpoint", &self.endpoint())
            .field("config", &self.config)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

fn invalid_identifier(raw: &str, message: &str) -> LookupOutcome {
    LookupOutcome::failed(
        raw,
        FailureCause::InvalidIdentifier {
            message: message.to_owned(),
        },
    )
}

fn bootstrap_panicked(panic: &(dyn std::any::Any + Send)) -> String {
    panic_message("bootstrap", panic)
}

fn panic_message(stage: &str, panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("{stage} panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("{stage} panicked: {message}")
    } else {
        format!("{stage} panicked")
    }
}
