//! Batch lookup configuration.
//!
//! # Environment Variables
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ORGPROBE_CONCURRENCY_LIMIT` | `concurrency_limit` | `100` |
//! | `ORGPROBE_REQUEST_TIMEOUT_SECS` | `request_timeout` | `5` |
//! | `ORGPROBE_RAISE_ON_PARSE_FAILURE` | `raise_on_parse_failure` | `true` |
//! | `ORGPROBE_RAISE_ON_TRANSPORT_FAILURE` | `raise_on_transport_failure` | `true` |
//! | `ORGPROBE_REQUESTS_PER_SECOND` | `requests_per_second` | unset |

use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::error::ConfigError;
use crate::http_client::DEFAULT_REQUEST_TIMEOUT;

pub const DEFAULT_CONCURRENCY_LIMIT: usize = 100;

const ENV_CONCURRENCY_LIMIT: &str = "ORGPROBE_CONCURRENCY_LIMIT";
const ENV_REQUEST_TIMEOUT_SECS: &str = "ORGPROBE_REQUEST_TIMEOUT_SECS";
const ENV_RAISE_ON_PARSE_FAILURE: &str = "ORGPROBE_RAISE_ON_PARSE_FAILURE";
const ENV_RAISE_ON_TRANSPORT_FAILURE: &str = "ORGPROBE_RAISE_ON_TRANSPORT_FAILURE";
const ENV_REQUESTS_PER_SECOND: &str = "ORGPROBE_REQUESTS_PER_SECOND";

/// Tuning knobs for a batch of lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    /// Maximum number of lookups with a request in flight.
    pub concurrency_limit: usize,
    /// Timeout applied to each request, and to the session bootstrap.
    pub request_timeout: Duration,
    /// When false, a response that cannot be parsed resolves to `Empty`.
    pub raise_on_parse_failure: bool,
    /// When false, a transport failure resolves to `Empty`.
    pub raise_on_transport_failure: bool,
    /// Optional cap on requests issued per second across the batch.
    pub requests_per_second: Option<NonZeroU32>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            raise_on_parse_failure: true,
            raise_on_transport_failure: true,
            requests_per_second: None,
        }
    }
}

impl LookupConfig {
    /// Defaults overridden by any `ORGPROBE_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_CONCURRENCY_LIMIT) {
            config.concurrency_limit = parse_env(ENV_CONCURRENCY_LIMIT, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let seconds: f64 = parse_env(ENV_REQUEST_TIMEOUT_SECS, &value)?;
            config.request_timeout = Duration::try_from_secs_f64(seconds).map_err(|_| {
                ConfigError::InvalidEnv {
                    var: ENV_REQUEST_TIMEOUT_SECS,
                    value: value.clone(),
                }
            })?;
        }
        if let Some(value) = lookup(ENV_RAISE_ON_PARSE_FAILURE) {
            config.raise_on_parse_failure = parse_flag(ENV_RAISE_ON_PARSE_FAILURE, &value)?;
        }
        if let Some(value) = lookup(ENV_RAISE_ON_TRANSPORT_FAILURE) {
            config.raise_on_transport_failure =
                parse_flag(ENV_RAISE_ON_TRANSPORT_FAILURE, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUESTS_PER_SECOND) {
            config.requests_per_second = Some(parse_env(ENV_REQUESTS_PER_SECOND, &value)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_raise_on_parse_failure(mut self, raise: bool) -> Self {
        self.raise_on_parse_failure = raise;
        self
    }

    pub fn with_raise_on_transport_failure(mut self, raise: bool) -> Self {
        self.raise_on_transport_failure = raise;
        self
    }

    pub fn with_requests_per_second(mut self, rate: Option<NonZeroU32>) -> Self {
        self.requests_per_second = rate;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_owned(),
    })
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_owned(),
        }),
    }
}
