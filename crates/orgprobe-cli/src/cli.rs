//! CLI argument definitions for orgprobe.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lookup` | Look up organization codes on one registry |
//! | `endpoints` | List supported registries |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit with code 3 when any lookup failed |
//! | `--concurrency` | `100` | Maximum lookups in flight |
//! | `--timeout-secs` | `5` | Per-request timeout |
//! | `--rate-limit` | none | Maximum requests started per second |
//! | `--deadline-secs` | none | Overall batch deadline |
//!
//! Unset options fall back to the `ORGPROBE_*` environment variables.
//!
//! # Examples
//!
//! ```bash
//! orgprobe lookup --endpoint companies 38345394 12345678
//! orgprobe lookup --endpoint certificates --input codes.txt --format ndjson
//! orgprobe lookup --endpoint licenses --input codes.txt --strict --deadline-secs 60
//! ```

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use orgprobe_core::EndpointId;

/// Batch lookups of organization codes against public registries.
#[derive(Debug, Parser)]
#[command(name = "orgprobe", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Exit with code 3 when any lookup did not succeed or come back empty.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Maximum number of lookups with a request in flight.
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<f64>,

    /// Resolve unparseable responses as empty instead of failed.
    #[arg(long, global = true, default_value_t = false)]
    pub lenient_parse: bool,

    /// Resolve transport failures as empty instead of failed.
    #[arg(long, global = true, default_value_t = false)]
    pub absorb_transport_failures: bool,

    /// Maximum number of requests started per second.
    #[arg(long, global = true)]
    pub rate_limit: Option<NonZeroU32>,

    /// Abort the whole batch after this many seconds.
    #[arg(long, global = true)]
    pub deadline_secs: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table for terminal display.
    Table,
    /// Single JSON report.
    Json,
    /// One JSON outcome per line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up organization codes on one registry.
    ///
    /// Codes come from the command line and/or a file with one code per
    /// line; blank lines and lines starting with `#` are skipped.
    Lookup(LookupArgs),

    /// List supported registries and whether they need a session.
    Endpoints,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Registry to query (certificates, licenses, companies).
    #[arg(long, short = 'e')]
    pub endpoint: EndpointId,

    /// File with one organization code per line.
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Organization codes (8 or 10 characters).
    pub codes: Vec<String>,
}
