//! Normalized lookup outcomes.
//!
//! Every identifier submitted to a batch resolves to exactly one
//! [`LookupOutcome`]. Callers must be able to tell "found" from "not found"
//! from "failed", so the three cases are separate variants rather than a
//! status code on a shared record.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{OrganizationCode, Payload};

/// Coarse status of an outcome, matching the `1 / 0 / -1` codes of the
/// legacy record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Empty,
    Failed,
}

impl OutcomeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }

    pub const fn code(self) -> i8 {
        match self {
            Self::Success => 1,
            Self::Empty => 0,
            Self::Failed => -1,
        }
    }
}

impl Display for OutcomeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "status", rename_all = "snake_case")]
pub enum TransportFailureKind {
    Timeout,
    Connect,
    Status(u16),
    Other,
}

/// Why a lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    #[error("invalid identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("session bootstrap failed: {message}")]
    BootstrapFailed { message: String },

    #[error("transport error: {message}")]
    Transport {
        failure: TransportFailureKind,
        message: String,
    },

    #[error("could not parse response: {message}")]
    ParseFailure { message: String },

    /// A failure that crossed a boundary carrying only a formatted message.
    #[error("{message}")]
    Opaque { message: String },
}

impl FailureCause {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "lookup.invalid_identifier",
            Self::BootstrapFailed { .. } => "lookup.bootstrap_failed",
            Self::Transport { .. } => "lookup.transport",
            Self::ParseFailure { .. } => "lookup.parse_failure",
            Self::Opaque { .. } => "lookup.opaque",
        }
    }
}

/// Result of looking up one organization code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The endpoint returned usable data.
    Success {
        org_code: OrganizationCode,
        payload: Payload,
    },
    /// The endpoint answered but holds no data for this code.
    Empty { org_code: OrganizationCode },
    /// The lookup failed. `org_code` is the submitted identifier, or `None`
    /// when the failure could not be attributed.
    Failed {
        org_code: Option<String>,
        cause: FailureCause,
    },
}

impl LookupOutcome {
    pub fn success(org_code: OrganizationCode, payload: Payload) -> Self {
        Self::Success { org_code, payload }
    }

    pub fn empty(org_code: OrganizationCode) -> Self {
        Self::Empty { org_code }
    }

    pub fn failed(org_code: impl Into<String>, cause: FailureCause) -> Self {
        Self::Failed {
            org_code: Some(org_code.into()),
            cause,
        }
    }

    pub fn unattributed(cause: FailureCause) -> Self {
        Self::Failed {
            org_code: None,
            cause,
        }
    }

    pub const fn status(&self) -> OutcomeStatus {
        match self {
            Self::Success { .. } => OutcomeStatus::Success,
            Self::Empty { .. } => OutcomeStatus::Empty,
            Self::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    /// The identifier this outcome belongs to, if known.
    pub fn org_code(&self) -> Option<&str> {
        match self {
            Self::Success { org_code, .. } | Self::Empty { org_code } => Some(org_code.as_str()),
            Self::Failed { org_code, .. } => org_code.as_deref(),
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Failed { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn is_unattributable(&self) -> bool {
        matches!(self, Self::Failed { org_code: None, .. })
    }
}

/// Per-status tally of a resolved batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub empty: usize,
    pub failed: usize,
    pub unattributable: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[LookupOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            summary.total += 1;
            match outcome.status() {
                OutcomeStatus::Success => summary.success += 1,
                OutcomeStatus::Empty => summary.empty += 1,
                OutcomeStatus::Failed => summary.failed += 1,
            }
            if outcome.is_unattributable() {
                summary.unattributable += 1;
            }
            summary
        })
    }
}
