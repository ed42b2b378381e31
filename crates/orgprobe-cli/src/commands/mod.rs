mod endpoints;
mod lookup;

use orgprobe_core::{BatchSummary, EndpointId, LookupOutcome};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Result of a lookup batch as written to stdout.
#[derive(Debug, Serialize)]
pub struct LookupReport {
    pub endpoint: EndpointId,
    pub summary: BatchSummary,
    pub latency_ms: u64,
    pub outcomes: Vec<LookupOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointInfo {
    pub id: EndpointId,
    pub requires_session: bool,
}

#[derive(Debug)]
pub enum CommandOutput {
    Lookup(LookupReport),
    Endpoints(Vec<EndpointInfo>),
}

impl CommandOutput {
    /// Lookups that ended in `Failed`.
    pub fn failed_count(&self) -> usize {
        match self {
            Self::Lookup(report) => report.summary.failed,
            Self::Endpoints(_) => 0,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Lookup(args) => Ok(CommandOutput::Lookup(lookup::run(cli, args).await?)),
        Command::Endpoints => Ok(CommandOutput::Endpoints(endpoints::run())),
    }
}
