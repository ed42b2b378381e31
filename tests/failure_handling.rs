//! Behavior-driven tests for failure handling
//!
//! These tests verify HOW failures stay contained: a broken lookup never
//! takes its siblings down, every failure names the code it belongs to,
//! and only whole-batch conditions surface as errors.

mod support;

use std::sync::Arc;
use std::time::Duration;

use orgprobe_core::{
    BatchError, FailureCause, FailureClassifier, HttpError, LookupConfig, LookupOutcome,
    OpaqueFailure, OrganizationCode, OutcomeStatus, TransportFailureKind,
};
use tokio_util::sync::CancellationToken;

use support::{dispatcher, outcome_for, FakeAdapter, Reply, ScriptedHttp, FOUND, NOT_FOUND};

// =============================================================================
// Failure: Session Bootstrap
// =============================================================================

#[tokio::test]
async fn when_bootstrap_fails_every_valid_code_fails_and_no_request_is_built() {
    // Given: an adapter whose session setup is refused
    let adapter = Arc::new(FakeAdapter::new().with_failing_bootstrap("PHPSESSID cookie missing"));
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs
    let outcomes = dispatcher.run(["38345394", "12345678", "bad"]).await;

    // Then: valid codes fail with the bootstrap cause, invalid keep theirs
    assert_eq!(outcomes.len(), 3);
    for code in ["38345394", "12345678"] {
        assert_eq!(
            outcome_for(&outcomes, code).cause(),
            Some(&FailureCause::BootstrapFailed {
                message: String::from("PHPSESSID cookie missing")
            })
        );
    }
    assert!(matches!(
        outcome_for(&outcomes, "bad").cause(),
        Some(FailureCause::InvalidIdentifier { .. })
    ));

    // And: the adapter was never asked to build or interpret anything
    assert_eq!(adapter.builds(), 0);
    assert_eq!(adapter.interprets(), 0);
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn when_bootstrap_never_answers_batch_fails_with_a_timeout() {
    // Given: a session setup that hangs and a short request timeout
    let adapter = Arc::new(FakeAdapter::new().with_hanging_bootstrap());
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(
        &adapter,
        &http,
        LookupConfig::default().with_request_timeout(Duration::from_millis(50)),
    );

    // When: the batch runs
    let outcomes = dispatcher.run(["38345394", "1234567890"]).await;

    // Then: every code fails with a timed-out bootstrap and nothing is sent
    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        match outcome.cause() {
            Some(FailureCause::BootstrapFailed { message }) => {
                assert!(message.contains("timed out"), "{message}");
            }
            other => panic!("expected bootstrap failure, got {other:?}"),
        }
    }
    assert_eq!(http.calls(), 0);
    assert_eq!(adapter.builds(), 0);
}

#[tokio::test]
async fn when_bootstrap_future_panics_batch_fails_without_requests() {
    // Given: a session setup that panics while running
    let adapter = Arc::new(FakeAdapter::new().with_bootstrap_panicking_in_future());
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs
    let outcomes = dispatcher.run(["38345394", "12345678", "bad"]).await;

    // Then: valid codes fail with the panic message, the invalid one keeps its cause
    assert_eq!(outcomes.len(), 3);
    for code in ["38345394", "12345678"] {
        match outcome_for(&outcomes, code).cause() {
            Some(FailureCause::BootstrapFailed { message }) => {
                assert!(message.contains("bootstrap panicked"), "{message}");
                assert!(message.contains("blew up"), "{message}");
            }
            other => panic!("expected bootstrap failure, got {other:?}"),
        }
    }
    assert!(matches!(
        outcome_for(&outcomes, "bad").cause(),
        Some(FailureCause::InvalidIdentifier { .. })
    ));
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn when_bootstrap_panics_before_returning_a_future_batch_still_resolves() {
    // Given: an adapter that panics as soon as a session is requested
    let adapter = Arc::new(FakeAdapter::new().with_bootstrap_panicking_on_call());
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch and a single lookup run
    let outcomes = dispatcher.run(["38345394", "1234567890"]).await;
    let single = dispatcher.lookup_one("12345678").await;

    // Then: the panic is contained as a bootstrap failure for every code
    assert_eq!(outcomes.len(), 2);
    for outcome in outcomes.iter().chain([&single]) {
        match outcome.cause() {
            Some(FailureCause::BootstrapFailed { message }) => {
                assert!(message.contains("could not start its session"), "{message}");
            }
            other => panic!("expected bootstrap failure, got {other:?}"),
        }
    }
    assert_eq!(adapter.bootstraps(), 2);
    assert_eq!(http.calls(), 0);
}

// =============================================================================
// Failure: Sibling Isolation
// =============================================================================

#[tokio::test]
async fn when_one_lookup_hangs_siblings_still_resolve() {
    // Given: one code whose request never answers and a short timeout
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)).with_reply("22222222", Reply::Hang));
    let dispatcher = dispatcher(
        &adapter,
        &http,
        LookupConfig::default().with_request_timeout(Duration::from_millis(50)),
    );

    // When: the batch runs
    let outcomes = dispatcher.run(["11111111", "22222222", "33333333"]).await;

    // Then: the hung code times out and the others succeed
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcome_for(&outcomes, "22222222").cause(),
        Some(FailureCause::Transport {
            failure: TransportFailureKind::Timeout,
            ..
        })
    ));
    for code in ["11111111", "33333333"] {
        assert_eq!(outcome_for(&outcomes, code).status(), OutcomeStatus::Success);
    }
}

#[tokio::test]
async fn when_upstream_fails_the_failure_names_the_code() {
    // Given: one refused connection and one server error
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(
        ScriptedHttp::new(Reply::Body(NOT_FOUND))
            .with_reply("11111111", Reply::Fail(HttpError::connect("connection refused")))
            .with_reply("22222222", Reply::Status(503)),
    );
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs
    let outcomes = dispatcher.run(["11111111", "22222222", "33333333"]).await;

    // Then: each failure carries its own code and transport kind
    assert!(matches!(
        outcome_for(&outcomes, "11111111").cause(),
        Some(FailureCause::Transport {
            failure: TransportFailureKind::Connect,
            ..
        })
    ));
    assert!(matches!(
        outcome_for(&outcomes, "22222222").cause(),
        Some(FailureCause::Transport {
            failure: TransportFailureKind::Status(503),
            ..
        })
    ));
    assert_eq!(outcome_for(&outcomes, "33333333").status(), OutcomeStatus::Empty);
}

#[tokio::test]
async fn when_adapter_panics_failure_is_attributed_and_siblings_survive() {
    // Given: an adapter with a bug triggered by one code
    let adapter = Arc::new(FakeAdapter::new().panicking_on("66666666"));
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs
    let outcomes = dispatcher.run(["66666666", "77777777"]).await;

    // Then: the panic becomes a failure for that code only
    assert_eq!(outcomes.len(), 2);
    let broken = outcome_for(&outcomes, "66666666");
    match broken.cause() {
        Some(FailureCause::Opaque { message }) => assert!(message.contains("blew up")),
        other => panic!("expected opaque failure, got {other:?}"),
    }
    assert_eq!(outcome_for(&outcomes, "77777777").status(), OutcomeStatus::Success);
}

#[tokio::test]
async fn when_failures_occur_no_outcome_names_a_code_outside_the_batch() {
    // Given: a batch where every kind of failure happens
    let adapter = Arc::new(FakeAdapter::new().panicking_on("44444444"));
    let http = Arc::new(
        ScriptedHttp::new(Reply::Body("garbage"))
            .with_reply("11111111", Reply::Fail(HttpError::new("reset [99999999]")))
            .with_reply("22222222", Reply::Status(404)),
    );
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());
    let submitted = ["11111111", "22222222", "33333333", "44444444", "5"];

    // When: the batch runs
    let outcomes = dispatcher.run(submitted).await;

    // Then: every outcome is failed and tagged with a submitted code
    assert_eq!(outcomes.len(), submitted.len());
    for outcome in &outcomes {
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        let code = outcome.org_code().expect("attributed");
        assert!(submitted.contains(&code), "{code} was never submitted");
    }
}

// =============================================================================
// Failure: Configurable Policies
// =============================================================================

#[tokio::test]
async fn when_response_is_unparseable_policy_decides_between_failed_and_empty() {
    // Given: a registry answering with a body the adapter cannot read
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Body("<html>maintenance</html>")));

    // When: the batch runs with the default policy
    let strict = dispatcher(&adapter, &http, LookupConfig::default())
        .run(["38345394"])
        .await;

    // Then: the code fails with a parse failure
    assert!(matches!(
        strict[0].cause(),
        Some(FailureCause::ParseFailure { .. })
    ));

    // When: the batch runs with parse failures absorbed
    let lenient = dispatcher(
        &adapter,
        &http,
        LookupConfig::default().with_raise_on_parse_failure(false),
    )
    .run(["38345394"])
    .await;

    // Then: the code resolves to "no data"
    assert_eq!(lenient[0].status(), OutcomeStatus::Empty);
    assert_eq!(lenient[0].status().code(), 0);
}

#[tokio::test]
async fn when_transport_failures_are_absorbed_codes_resolve_empty() {
    // Given: a registry that refuses every connection
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Fail(HttpError::connect("refused"))));
    let dispatcher = dispatcher(
        &adapter,
        &http,
        LookupConfig::default().with_raise_on_transport_failure(false),
    );

    // When: the batch runs
    let outcomes = dispatcher.run(["11111111", "22222222"]).await;

    // Then: nothing fails, nothing is found
    assert!(outcomes
        .iter()
        .all(|outcome| outcome.status() == OutcomeStatus::Empty));
    assert_eq!(adapter.interprets(), 0);
}

// =============================================================================
// Failure: Batch-Level Conditions
// =============================================================================

#[tokio::test]
async fn when_batch_is_cancelled_system_reports_cancellation() {
    // Given: a registry that never answers
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Hang));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());
    let cancel = CancellationToken::new();

    // When: the caller cancels shortly after starting
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let result = dispatcher
        .run_cancellable(["11111111", "22222222"], &cancel)
        .await;

    // Then: the batch ends with a cancellation error
    assert_eq!(result, Err(BatchError::Cancelled));
}

#[tokio::test]
async fn when_deadline_passes_system_reports_deadline_exceeded() {
    // Given: a registry that never answers
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Hang));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs with a short deadline
    let deadline = Duration::from_millis(30);
    let result = dispatcher.run_with_deadline(["11111111"], deadline).await;

    // Then: the batch ends with a deadline error
    assert_eq!(result, Err(BatchError::DeadlineExceeded { deadline }));
}

#[tokio::test]
async fn when_deadline_is_generous_system_returns_every_outcome() {
    // Given: a responsive registry
    let adapter = Arc::new(FakeAdapter::new());
    let http = Arc::new(ScriptedHttp::new(Reply::Body(FOUND)));
    let dispatcher = dispatcher(&adapter, &http, LookupConfig::default());

    // When: the batch runs with a deadline it easily meets
    let outcomes = dispatcher
        .run_with_deadline(["11111111", "22222222"], Duration::from_secs(5))
        .await
        .expect("batch finishes in time");

    // Then: the result is complete
    assert_eq!(outcomes.len(), 2);
}

// =============================================================================
// Failure: Classification of Opaque Errors
// =============================================================================

#[test]
fn when_message_names_a_code_in_brackets_classifier_attributes_it() {
    // Given: a failure known only by its message
    let failure = OpaqueFailure::new("[38345394] -> Request on registry failed");

    // When: it is classified
    let outcome = orgprobe_core::classify(&failure);

    // Then: the outcome carries the bracketed code
    assert_eq!(outcome.status(), OutcomeStatus::Failed);
    assert_eq!(outcome.org_code(), Some("38345394"));
}

#[test]
fn when_message_names_no_code_classifier_keeps_it_unattributed() {
    // Given: a failure without any code in its message
    let failure = OpaqueFailure::new("unknown error");

    // When: it is classified
    let outcome = orgprobe_core::classify(&failure);

    // Then: it is failed and explicitly unattributable
    assert!(outcome.is_unattributable());
    assert_eq!(
        outcome.cause(),
        Some(&FailureCause::Opaque {
            message: String::from("unknown error")
        })
    );
}

#[test]
fn when_batch_classifier_settles_results_every_entry_yields_one_outcome() {
    // Given: a batch classifier and a mix of outcomes and opaque failures
    let classifier = FailureClassifier::for_batch(["11111111", "22222222"]);
    let results = vec![
        Ok(LookupOutcome::empty(
            OrganizationCode::parse("11111111").expect("valid"),
        )),
        Err(OpaqueFailure::new("[22222222] broken pipe")),
        Err(OpaqueFailure::new("[38345394] not part of this batch")),
    ];

    // When: the results are settled
    let outcomes = classifier.settle(results);

    // Then: known codes are attributed, foreign ones are not invented
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1].org_code(), Some("22222222"));
    assert!(outcomes[2].is_unattributable());
}
