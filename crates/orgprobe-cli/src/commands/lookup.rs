use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use orgprobe_core::{adapter_for, BatchSummary, Dispatcher, LookupConfig, ReqwestHttpClient};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::LookupReport;
use crate::cli::{Cli, LookupArgs};
use crate::error::CliError;

pub async fn run(cli: &Cli, args: &LookupArgs) -> Result<LookupReport, CliError> {
    let codes = collect_codes(&args.codes, args.input.as_deref())?;
    if codes.is_empty() {
        return Err(CliError::Command(String::from(
            "no organization codes given; pass them as arguments or with --input",
        )));
    }

    let config = build_config(cli, LookupConfig::from_env()?)?;
    let dispatcher = Dispatcher::new(
        adapter_for(args.endpoint),
        Arc::new(ReqwestHttpClient::new()),
        config,
    )?;

    info!(endpoint = %args.endpoint, codes = codes.len(), "starting lookup batch");
    let started = Instant::now();

    let outcomes = match cli.deadline_secs {
        Some(secs) => {
            dispatcher
                .run_with_deadline(&codes, seconds("--deadline-secs", secs)?)
                .await?
        }
        None => {
            let cancel = CancellationToken::new();
            let interrupt = tokio::spawn({
                let cancel = cancel.clone();
                async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("interrupt received, cancelling batch");
                        cancel.cancel();
                    }
                }
            });
            let result = dispatcher.run_cancellable(&codes, &cancel).await;
            interrupt.abort();
            result?
        }
    };

    Ok(LookupReport {
        endpoint: args.endpoint,
        summary: BatchSummary::from_outcomes(&outcomes),
        latency_ms: started.elapsed().as_millis() as u64,
        outcomes,
    })
}

/// Codes from the command line followed by codes from `input`, if any.
fn collect_codes(args: &[String], input: Option<&Path>) -> Result<Vec<String>, CliError> {
    let mut codes = args.to_vec();
    if let Some(path) = input {
        codes.extend(parse_code_lines(&fs::read_to_string(path)?));
    }
    Ok(codes)
}

fn parse_code_lines(contents: &str) -> impl Iterator<Item = String> + '_ {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
}

/// Apply command-line overrides on top of the environment-derived config.
fn build_config(cli: &Cli, base: LookupConfig) -> Result<LookupConfig, CliError> {
    let mut config = base;
    if let Some(limit) = cli.concurrency {
        config = config.with_concurrency_limit(limit);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_request_timeout(seconds("--timeout-secs", secs)?);
    }
    if cli.lenient_parse {
        config = config.with_raise_on_parse_failure(false);
    }
    if cli.absorb_transport_failures {
        config = config.with_raise_on_transport_failure(false);
    }
    if cli.rate_limit.is_some() {
        config = config.with_requests_per_second(cli.rate_limit);
    }

    config.validate()?;
    Ok(config)
}

fn seconds(flag: &str, value: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| CliError::Command(format!("{flag} must be a non-negative number, got {value}")))
}
