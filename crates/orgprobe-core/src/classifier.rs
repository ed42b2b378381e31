//! Attribution of failures that arrive without structured context.
//!
//! Failures raised inside a lookup always carry their organization code.
//! This module covers the rest: errors handed over by collaborators that
//! only kept a formatted message. By convention such messages name the
//! responsible code in square brackets, e.g. `[38345394] request failed`.
//! A message without a usable bracketed code yields an unattributable
//! outcome; it is logged and kept, never guessed at.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, warn};

use crate::domain::OrganizationCode;
use crate::outcome::{FailureCause, LookupOutcome};

/// Log target for failures that could not be tied to an identifier.
pub const UNATTRIBUTABLE_TARGET: &str = "orgprobe::unattributable";

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]\s]+)\]").expect("bracketed code pattern is valid")
});

/// A failure known only by its message, optionally with the code it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueFailure {
    origin: Option<String>,
    message: String,
}

impl OpaqueFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            origin: None,
            message: message.into(),
        }
    }

    /// Failure whose originating code was known where it was raised.
    pub fn attributed(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            message: message.into(),
        }
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for OpaqueFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            Some(origin) => write!(f, "[{origin}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for OpaqueFailure {}

/// Turns opaque failures into `Failed` outcomes.
#[derive(Debug, Clone, Default)]
pub struct FailureClassifier {
    submitted: Option<HashSet<String>>,
}

impl FailureClassifier {
    /// Accept any well-formed code found in a message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only codes that were submitted in this batch.
    pub fn for_batch<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            submitted: Some(
                codes
                    .into_iter()
                    .map(|code| code.as_ref().to_owned())
                    .collect(),
            ),
        }
    }

    /// Build the `Failed` outcome for `failure`.
    ///
    /// An explicit origin wins; otherwise the first bracketed candidate that
    /// is a valid code (and, for batch classifiers, a submitted one) is used.
    pub fn classify(&self, failure: &OpaqueFailure) -> LookupOutcome {
        let cause = FailureCause::Opaque {
            message: failure.message().to_owned(),
        };

        match self.attribute(failure) {
            Some(code) => LookupOutcome::failed(code, cause),
            None => {
                error!(
                    target: UNATTRIBUTABLE_TARGET,
                    failure = %failure,
                    "failure could not be attributed to an organization code"
                );
                LookupOutcome::unattributed(cause)
            }
        }
    }

    /// Resolve a mix of completed lookups and opaque failures.
    pub fn settle<I>(&self, results: I) -> Vec<LookupOutcome>
    where
        I: IntoIterator<Item = Result<LookupOutcome, OpaqueFailure>>,
    {
        results
            .into_iter()
            .map(|result| match result {
                Ok(outcome) => outcome,
                Err(failure) => {
                    warn!(failure = %failure, "lookup failed outside the engine");
                    self.classify(&failure)
                }
            })
            .collect()
    }

    fn attribute(&self, failure: &OpaqueFailure) -> Option<String> {
        if let Some(origin) = failure.origin() {
            return Some(origin.to_owned());
        }

        BRACKETED
            .captures_iter(failure.message())
            .filter_map(|captures| captures.get(1))
            .map(|candidate| candidate.as_str())
            .find(|candidate| self.accepts(candidate))
            .map(str::to_owned)
    }

    fn accepts(&self, candidate: &str) -> bool {
        if OrganizationCode::parse(candidate).is_err() {
            return false;
        }
        self.submitted
            .as_ref()
            .map_or(true, |submitted| submitted.contains(candidate))
    }
}

/// Classify with a permissive classifier.
pub fn classify(failure: &OpaqueFailure) -> LookupOutcome {
    FailureClassifier::new().classify(failure)
}
